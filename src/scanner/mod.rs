//! Two-pass correlation of slow-request warnings with I/O completions.
//!
//! This module turns one log stream into a [`StreamResult`]:
//! - Pass 1 seeds a [`RequestTracker`] from slow-request warnings
//! - Pass 2 rewinds the stream and resolves request timing per peer
//!
//! Sources are opened by [`source::open_log`], which hides decompression
//! from the scanner.

pub mod log_scanner;
pub mod source;
pub mod tracker;

// Re-export main types
pub use log_scanner::{LogScanner, ScanConfig};
pub use source::{is_compressed, open_log, LogStream};
pub use tracker::{RequestTracker, StreamResult, TrackedRequest};
