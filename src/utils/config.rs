//! Configuration and constants for the CLI.

/// Base directory searched for OSD logs
pub const DEFAULT_LOG_DIR: &str = "/var/log/ceph/";

/// Completions slower than this keep a peer implicated
pub const DEFAULT_SLOW_THRESHOLD_SECS: u64 = 10;

// OSD logs are named ceph-osd.<id>.log, rotated copies get a suffix
// (ceph-osd.3.log.1.gz) which the --zip pattern picks up.
pub const OSD_LOG_PREFIX: &str = "ceph-osd.";
pub const OSD_LOG_SUFFIX: &str = ".log";

/// Extension of compressed (rotated) logs
pub const COMPRESSED_EXTENSION: &str = "gz";

/// Fractional digits kept when parsing timestamps (microseconds)
pub const TIMESTAMP_FRACTION_DIGITS: usize = 6;
