//! Aggregation of per-stream correlation results.
//!
//! This module folds every stream's tracked requests into one
//! slow-peer tally, ranked ascending by occurrence count.

pub mod report;

// Re-export main types and functions
pub use report::{build_report, AggregateStats, Aggregator, PeerCount, Report};
