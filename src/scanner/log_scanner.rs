//! Two-pass log scanner.
//!
//! Pass 1 reads every line looking for slow-request warnings and tracks
//! each request id the first time one names it. If nothing is slow, the
//! scan stops there.
//!
//! Pass 2 rewinds the stream and reads every I/O completion for a tracked
//! request. The client's send fixes the start time (first one wins). A
//! peer reply after that start is compared to the slow threshold: a fast
//! reply exonerates the peer, a slow one leaves it implicated. Replies
//! seen before the start time are unordered and ignored.

use super::source::open_log;
use super::tracker::{RequestTracker, StreamResult};
use crate::parser::{match_io_completion, match_slow_warning, Actor, IoCompletion};
use crate::utils::config::DEFAULT_SLOW_THRESHOLD_SECS;
use crate::utils::error::{ConfigError, ScanError};
use log::{debug, info, warn};
use std::io::{self, BufRead, Seek, SeekFrom};
use std::path::Path;
use std::time::Instant;

/// Scanner settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Replies at or above this latency keep a peer implicated
    pub slow_threshold: chrono::Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            slow_threshold: chrono::Duration::seconds(DEFAULT_SLOW_THRESHOLD_SECS as i64),
        }
    }
}

impl ScanConfig {
    /// Build a config from a threshold in (possibly fractional) seconds
    ///
    /// # Errors
    /// * `ConfigError::InvalidThreshold` - not finite, not positive, or too large
    pub fn from_secs_f64(secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ConfigError::InvalidThreshold(secs));
        }

        let std_duration = std::time::Duration::try_from_secs_f64(secs)
            .map_err(|_| ConfigError::InvalidThreshold(secs))?;
        let slow_threshold = chrono::Duration::from_std(std_duration)
            .map_err(|_| ConfigError::InvalidThreshold(secs))?;

        // Timestamps carry microseconds; anything finer rounds to nothing
        if slow_threshold < chrono::Duration::microseconds(1) {
            return Err(ConfigError::InvalidThreshold(secs));
        }

        Ok(Self { slow_threshold })
    }

    /// Threshold in seconds, for display
    pub fn threshold_secs(&self) -> f64 {
        self.slow_threshold.num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0
    }
}

/// Scans log streams into [`StreamResult`]s
#[derive(Debug, Clone, Default)]
pub struct LogScanner {
    config: ScanConfig,
}

impl LogScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Open and scan a log file (plain or gzip)
    ///
    /// **Public** - main entry point for file sources
    ///
    /// # Errors
    /// * `ScanError::SourceUnreadable` - the file cannot be opened or read
    pub fn scan_path(&self, path: &Path) -> Result<StreamResult, ScanError> {
        let name = path.display().to_string();
        info!("Scanning {}", name);

        let started = Instant::now();
        let reader = open_log(path)?;
        let result = self
            .scan(&name, reader)
            .map_err(|source| ScanError::SourceUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            "{}: {} slow request(s), {} pass(es) in {:.2}s",
            name,
            result.len(),
            result.passes(),
            started.elapsed().as_secs_f64()
        );
        Ok(result)
    }

    /// Scan one stream
    ///
    /// **Public** - the stream must be seekable so pass 2 can rewind it.
    /// Non-seekable sources should be buffered first (see `open_log`).
    pub fn scan<R: BufRead + Seek>(&self, name: &str, mut reader: R) -> io::Result<StreamResult> {
        let mut tracker = seed(name, &mut reader)?;

        if tracker.is_empty() {
            info!("{}: no slow requests, skipping second pass", name);
            return Ok(StreamResult::new(name, 1, tracker));
        }

        reader.seek(SeekFrom::Start(0))?;
        self.resolve(name, &mut reader, &mut tracker)?;

        Ok(StreamResult::new(name, 2, tracker))
    }

    /// Pass 2: attach timing to every tracked request
    fn resolve<R: BufRead>(
        &self,
        name: &str,
        reader: R,
        tracker: &mut RequestTracker,
    ) -> io::Result<()> {
        for_each_line(reader, |line_no, line| {
            let Some(matched) = match_io_completion(line) else {
                return;
            };
            match matched {
                Ok(completion) => self.apply_completion(tracker, completion),
                Err(e) => warn!("{}:{}: skipping line: {}", name, line_no, e),
            }
        })
    }

    /// Fold one completion into the tracker
    ///
    /// **Private** - completions for untracked requests are dropped
    fn apply_completion(&self, tracker: &mut RequestTracker, completion: IoCompletion) {
        let Some(request) = tracker.get_mut(&completion.request_id) else {
            return;
        };

        match completion.actor {
            Actor::Originator => {
                if !request.record_start(completion.timestamp) {
                    debug!(
                        "{}: ignoring repeated client send at {}",
                        completion.request_id, completion.timestamp
                    );
                }
            }
            Actor::Peer(peer) => {
                let Some(start) = request.start_time() else {
                    debug!(
                        "{}: reply from osd.{} before client send, ignored",
                        completion.request_id, peer
                    );
                    return;
                };

                let latency = completion.timestamp - start;
                if latency < self.config.slow_threshold {
                    request.exonerate(&peer);
                } else {
                    debug!(
                        "{}: osd.{} replied after {}ms",
                        completion.request_id,
                        peer,
                        latency.num_milliseconds()
                    );
                }
            }
        }
    }
}

/// Pass 1: track every request named by a slow warning
fn seed<R: BufRead>(name: &str, reader: R) -> io::Result<RequestTracker> {
    let mut tracker = RequestTracker::new();

    for_each_line(reader, |line_no, line| match match_slow_warning(line) {
        Some(Ok(warning)) => {
            tracker.track(warning);
        }
        Some(Err(e)) => warn!("{}:{}: skipping line: {}", name, line_no, e),
        None => {}
    })?;

    debug!("{}: tracking {} slow request(s)", name, tracker.len());
    Ok(tracker)
}

/// Call `f` with every line (1-based number, text without line ending)
///
/// Lines are decoded lossily so stray binary never aborts a scan.
fn for_each_line<R: BufRead>(mut reader: R, mut f: impl FnMut(usize, &str)) -> io::Result<()> {
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        line_no += 1;

        let line = String::from_utf8_lossy(&buf);
        f(line_no, line.trim_end_matches(|c| c == '\n' || c == '\r'));
    }
}
