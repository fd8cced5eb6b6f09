//! Plain-text report rendering.

use crate::aggregator::Report;

/// Render the report, one `OSD <id>: <count>` line per peer
///
/// **Public** - rows keep the report's ascending order
pub fn render_report(report: &Report) -> String {
    report
        .entries()
        .iter()
        .map(|entry| format!("OSD {}: {}\n", entry.peer, entry.count))
        .collect()
}

/// Message printed when no peer stayed slow
pub fn render_no_slow_peers(threshold_secs: f64) -> String {
    format!(
        "No slow peers found with latency greater than {} seconds.\n",
        threshold_secs
    )
}

/// Message printed when not a single log could be read
pub fn render_no_logs_read(failed: usize) -> String {
    format!(
        "No OSD logs could be read ({} failed); no slow-peer report produced.\n",
        failed
    )
}

/// Render either outcome of aggregation
pub fn render_outcome(report: Option<&Report>, threshold_secs: f64) -> String {
    match report {
        Some(report) => render_report(report),
        None => render_no_slow_peers(threshold_secs),
    }
}
