//! Output rendering for hunt results.
//!
//! - Plain-text ranked report (stdout)
//! - Pretty JSON dump of tracked requests for `-vvv`

pub mod state;
pub mod text;

// Re-export main functions
pub use state::dump_state;
pub use text::{render_no_logs_read, render_no_slow_peers, render_outcome, render_report};
