//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod hunt;
pub mod models;

// Re-export main command functions
pub use hunt::{discover_sources, execute_hunt, hunt, osd_log_pattern, validate_args, HuntOutcome};
pub use models::{HuntArgs, Target};
