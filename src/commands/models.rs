use crate::utils::config::{DEFAULT_LOG_DIR, DEFAULT_SLOW_THRESHOLD_SECS};
use std::path::PathBuf;

/// Which logs to hunt through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The log of one OSD on this host
    Osd(String),

    /// Every OSD log in the log directory
    AllOsds,

    /// Explicit log files
    Files(Vec<PathBuf>),
}

/// Arguments for the hunt command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct HuntArgs {
    /// What to scan (None until the user picks something)
    pub target: Option<Target>,

    /// Base directory for log discovery
    pub log_dir: PathBuf,

    /// Also scan rotated/compressed logs
    pub include_compressed: bool,

    /// Replies at or above this many seconds keep a peer implicated
    pub threshold_secs: f64,

    /// 0 = report only, >=1 per-file progress, >=3 dump tracked requests
    pub verbosity: u8,
}

impl Default for HuntArgs {
    fn default() -> Self {
        Self {
            target: None,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            include_compressed: false,
            threshold_secs: DEFAULT_SLOW_THRESHOLD_SECS as f64,
            verbosity: 0,
        }
    }
}

impl HuntArgs {
    /// Whether the tracked-request dump was asked for
    pub fn dump_state(&self) -> bool {
        self.verbosity >= 3
    }
}
