//! Fold per-stream results into a ranked per-peer report.
//!
//! A request counts only when its start time was found and it still has
//! implicated peers; every remaining peer gets one occurrence. Requests
//! without a start time are indeterminate and count for nothing.

use crate::parser::PeerId;
use crate::scanner::StreamResult;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerCount {
    pub peer: PeerId,
    pub count: usize,
}

/// Slow-peer tally, ascending by count
///
/// **Public** - ties keep discovery order (source order, then request
/// order within a source, then peer order within its warning)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    entries: Vec<PeerCount>,
}

impl Report {
    pub fn entries(&self) -> &[PeerCount] {
        &self.entries
    }

    pub fn count_for(&self, peer: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.peer == peer)
            .map(|entry| entry.count)
    }

    /// Peer with the most occurrences (last entry)
    pub fn worst(&self) -> Option<&PeerCount> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bookkeeping gathered while folding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Streams folded
    pub streams: usize,

    /// Tracked requests seen across all streams
    pub requests: usize,

    /// Requests whose originating send never appeared
    pub indeterminate: usize,

    /// Requests where every implicated peer turned out fast
    pub exonerated: usize,
}

impl AggregateStats {
    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Streams: {} | Slow requests: {} | Indeterminate: {} | Exonerated: {}",
            self.streams, self.requests, self.indeterminate, self.exonerated
        )
    }
}

/// Accumulates stream results into a [`Report`]
#[derive(Debug, Default)]
pub struct Aggregator {
    tally: Vec<PeerCount>,
    index: HashMap<PeerId, usize>,
    stats: AggregateStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one stream's tracked requests to the tally
    pub fn fold(&mut self, result: &StreamResult) {
        self.stats.streams += 1;

        for request in result.requests() {
            self.stats.requests += 1;

            if request.start_time().is_none() {
                self.stats.indeterminate += 1;
                continue;
            }

            let slow = request.slow_peers();
            if slow.is_empty() {
                self.stats.exonerated += 1;
                continue;
            }

            for peer in slow {
                self.increment(peer);
            }
        }

        debug!("Folded {}: {}", result.source(), self.stats.summary());
    }

    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    /// Finish the tally
    ///
    /// # Returns
    /// `None` when no peer was left slow, so callers can say so explicitly
    pub fn finish(self) -> Option<Report> {
        if self.tally.is_empty() {
            return None;
        }

        let mut entries = self.tally;
        // Stable: equal counts keep discovery order
        entries.sort_by_key(|entry| entry.count);

        Some(Report { entries })
    }

    fn increment(&mut self, peer: &PeerId) {
        match self.index.get(peer) {
            Some(&i) => self.tally[i].count += 1,
            None => {
                self.index.insert(peer.clone(), self.tally.len());
                self.tally.push(PeerCount {
                    peer: peer.clone(),
                    count: 1,
                });
            }
        }
    }
}

/// Build a report from stream results in the given order
///
/// **Public** - convenience wrapper around [`Aggregator`]
pub fn build_report<'a>(results: impl IntoIterator<Item = &'a StreamResult>) -> Option<Report> {
    let mut aggregator = Aggregator::new();
    for result in results {
        aggregator.fold(result);
    }
    aggregator.finish()
}
