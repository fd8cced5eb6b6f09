//! Log line parsing.
//!
//! This module handles:
//! - Parsing the fixed `YYYY-MM-DD HH:MM:SS.ffffff` timestamp grammar
//! - Classifying a line as a slow-request warning, an I/O completion, or neither

pub mod event;
pub mod timestamp;

// Re-export main types
pub use event::{
    classify_line, match_io_completion, match_slow_warning, Actor, IoCompletion, LogEvent, PeerId,
    RequestId, SlowWarning,
};
pub use timestamp::{parse_timestamp, Timestamp};
