//! Hunt command implementation.
//!
//! The hunt command:
//! 1. Locates the OSD logs to scan
//! 2. Scans every log in two passes, one worker per log
//! 3. Folds the results into a slow-peer report
//! 4. Prints the report

use super::models::{HuntArgs, Target};
use crate::aggregator::{AggregateStats, Aggregator, Report};
use crate::output::{dump_state, render_no_logs_read, render_outcome};
use crate::scanner::{LogScanner, ScanConfig, StreamResult};
use crate::utils::config::{OSD_LOG_PREFIX, OSD_LOG_SUFFIX};
use crate::utils::error::{DiscoveryError, ScanError};
use anyhow::{Context, Result};
use glob::{glob, Pattern};
use log::{debug, error, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything a hunt produced
#[derive(Debug)]
pub struct HuntOutcome {
    /// Per-log results, in discovery order
    pub results: Vec<StreamResult>,

    /// Ranked slow peers, `None` when nothing stayed slow
    pub report: Option<Report>,

    pub stats: AggregateStats,

    /// Logs that could not be read
    pub failures: Vec<ScanError>,

    pub threshold_secs: f64,
}

impl HuntOutcome {
    /// True when every log was read
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Final text for stdout
    ///
    /// A hunt that read no log at all has no report to give, clean or not.
    pub fn render(&self) -> String {
        if self.results.is_empty() && !self.failures.is_empty() {
            return render_no_logs_read(self.failures.len());
        }
        render_outcome(self.report.as_ref(), self.threshold_secs)
    }
}

/// Execute the hunt command and print its report
///
/// **Public** - main entry point called from main.rs
///
/// Unreadable logs are logged as errors; the remaining logs are still
/// scanned and reported. The caller decides the exit status from
/// [`HuntOutcome::is_complete`].
pub fn execute_hunt(args: &HuntArgs) -> Result<HuntOutcome> {
    let outcome = hunt(args)?;

    for failure in &outcome.failures {
        error!("{}", failure);
    }

    if args.dump_state() {
        let state = dump_state(&outcome.results).context("Failed to dump tracked requests")?;
        println!("{}", state);
    }

    print!("{}", outcome.render());

    Ok(outcome)
}

/// Run a hunt without printing anything
///
/// **Public** - library entry point
///
/// # Errors
/// * Invalid arguments
/// * No log files found for the target
pub fn hunt(args: &HuntArgs) -> Result<HuntOutcome> {
    let started = Instant::now();

    validate_args(args)?;
    let config = ScanConfig::from_secs_f64(args.threshold_secs)?;
    let target = args
        .target
        .as_ref()
        .context("No OSD selected")?;

    let sources = discover_sources(target, &args.log_dir, args.include_compressed)
        .context("Failed to locate OSD logs")?;
    info!("Found {} log file(s)", sources.len());

    let scanner = LogScanner::new(config);
    let (results, failures) = scan_sources(&scanner, &sources);

    let mut aggregator = Aggregator::new();
    for result in &results {
        aggregator.fold(result);
    }
    let stats = aggregator.stats();
    info!("{}", stats.summary());

    let report = aggregator.finish();

    info!(
        "Hunt completed in {:.2}s",
        started.elapsed().as_secs_f64()
    );

    Ok(HuntOutcome {
        results,
        report,
        stats,
        failures,
        threshold_secs: config.threshold_secs(),
    })
}

/// Scan every source in parallel
///
/// **Public** - results keep the order of `sources`, whatever order the
/// workers finish in
pub fn scan_sources(
    scanner: &LogScanner,
    sources: &[PathBuf],
) -> (Vec<StreamResult>, Vec<ScanError>) {
    let scanned: Vec<Result<StreamResult, ScanError>> = sources
        .par_iter()
        .map(|path| scanner.scan_path(path))
        .collect();

    let mut results = Vec::with_capacity(scanned.len());
    let mut failures = Vec::new();
    for outcome in scanned {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => failures.push(e),
        }
    }

    (results, failures)
}

/// Resolve a target to the log files to scan
///
/// **Public** - a single OSD always yields at least its log path, so a
/// missing log surfaces as an unreadable source with or without
/// `include_compressed`
///
/// # Errors
/// * `DiscoveryError::InvalidPattern` - the log directory made a bad glob
/// * `DiscoveryError::NoSources` - `AllOsds` matched nothing
pub fn discover_sources(
    target: &Target,
    log_dir: &Path,
    include_compressed: bool,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    match target {
        Target::Files(files) => Ok(files.clone()),
        Target::Osd(id) if !include_compressed => {
            Ok(vec![osd_log_path(log_dir, id)])
        }
        Target::Osd(id) => match glob_sources(&osd_log_pattern(log_dir, Some(id), true)) {
            // Same as without --zip: the missing log is an unreadable source
            Err(DiscoveryError::NoSources(_)) => Ok(vec![osd_log_path(log_dir, id)]),
            found => found,
        },
        Target::AllOsds => glob_sources(&osd_log_pattern(log_dir, None, include_compressed)),
    }
}

/// Path of the current (unrotated) log of one OSD
fn osd_log_path(log_dir: &Path, id: &str) -> PathBuf {
    log_dir.join(format!("{OSD_LOG_PREFIX}{id}{OSD_LOG_SUFFIX}"))
}

/// Glob pattern for OSD logs in `log_dir`
///
/// **Public** - `osd: None` matches every OSD; `include_compressed`
/// widens the suffix to rotated logs (`ceph-osd.3.log.1.gz`)
pub fn osd_log_pattern(log_dir: &Path, osd: Option<&str>, include_compressed: bool) -> String {
    let id = osd.map_or_else(|| "*".to_string(), Pattern::escape);
    let rotated = if include_compressed { "*" } else { "" };

    Path::new(&Pattern::escape(&log_dir.to_string_lossy()))
        .join(format!("{OSD_LOG_PREFIX}{id}{OSD_LOG_SUFFIX}{rotated}"))
        .to_string_lossy()
        .into_owned()
}

/// Files matching `pattern`, sorted
fn glob_sources(pattern: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    debug!("Discovering logs with pattern {}", pattern);

    let mut paths: Vec<PathBuf> = glob(pattern)
        .map_err(|source| DiscoveryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();

    if paths.is_empty() {
        return Err(DiscoveryError::NoSources(pattern.to_string()));
    }

    paths.sort();
    Ok(paths)
}

/// Validate hunt arguments
///
/// **Public** - can be called before execute_hunt for early validation
pub fn validate_args(args: &HuntArgs) -> Result<()> {
    match &args.target {
        None => anyhow::bail!("No OSD selected: give an OSD id, --osd <ID>, --all or --file <PATH>"),
        Some(Target::Osd(id)) => {
            if id.is_empty() {
                anyhow::bail!("OSD id cannot be empty");
            }
            if id.contains(|c: char| c == '/' || c == '\\' || c.is_whitespace()) {
                anyhow::bail!("OSD id contains invalid characters: {:?}", id);
            }
        }
        Some(Target::Files(files)) => {
            if files.is_empty() {
                anyhow::bail!("At least one log file must be given");
            }
        }
        Some(Target::AllOsds) => {}
    }

    if !args.threshold_secs.is_finite() || args.threshold_secs <= 0.0 {
        anyhow::bail!("Threshold must be a positive number of seconds");
    }

    Ok(())
}
