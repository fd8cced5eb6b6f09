//! Per-request correlation state.
//!
//! A [`TrackedRequest`] is created the first time a slow warning names a
//! request id, and then only ever moves peers from `implicated` to `fast`.

use crate::parser::{PeerId, RequestId, SlowWarning, Timestamp};
use serde::Serialize;
use std::collections::HashMap;

/// Correlation state for one slow request
///
/// **Public** - a peer is never in both `implicated` and `fast`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedRequest {
    request_id: RequestId,
    implicated: Vec<PeerId>,
    fast: Vec<PeerId>,
    start_time: Option<Timestamp>,
}

impl TrackedRequest {
    /// Create a request implicating `peers` (duplicates are dropped, order kept)
    pub fn new(request_id: RequestId, peers: impl IntoIterator<Item = PeerId>) -> Self {
        let mut implicated: Vec<PeerId> = Vec::new();
        for peer in peers {
            if !implicated.contains(&peer) {
                implicated.push(peer);
            }
        }

        Self {
            request_id,
            implicated,
            fast: Vec::new(),
            start_time: None,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Peers still suspected of being slow
    pub fn implicated_peers(&self) -> &[PeerId] {
        &self.implicated
    }

    /// Peers proven to have answered within the threshold
    pub fn fast_peers(&self) -> &[PeerId] {
        &self.fast
    }

    /// When the client sent the request, if the log shows it
    pub fn start_time(&self) -> Option<Timestamp> {
        self.start_time
    }

    /// Record the originating send time
    ///
    /// First write wins. Returns false if a start time was already set.
    pub fn record_start(&mut self, timestamp: Timestamp) -> bool {
        if self.start_time.is_some() {
            return false;
        }
        self.start_time = Some(timestamp);
        true
    }

    /// Reclassify `peer` as fast
    pub fn exonerate(&mut self, peer: &str) {
        self.implicated.retain(|p| p != peer);
        if !self.fast.iter().any(|p| p == peer) {
            self.fast.push(peer.to_string());
        }
    }

    /// Peers counted as slow: only meaningful once timing is known
    pub fn slow_peers(&self) -> &[PeerId] {
        match self.start_time {
            Some(_) => &self.implicated,
            None => &[],
        }
    }
}

/// Tracked requests of one stream, in first-seen order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestTracker {
    requests: Vec<TrackedRequest>,

    #[serde(skip)]
    index: HashMap<RequestId, usize>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking the request a slow warning names
    ///
    /// Only the first warning per request id is trusted. Returns false
    /// when the request was already tracked.
    pub fn track(&mut self, warning: SlowWarning) -> bool {
        if self.index.contains_key(&warning.request_id) {
            return false;
        }

        self.index
            .insert(warning.request_id.clone(), self.requests.len());
        self.requests
            .push(TrackedRequest::new(warning.request_id, warning.peers));
        true
    }

    pub fn contains(&self, request_id: &str) -> bool {
        self.index.contains_key(request_id)
    }

    pub fn get(&self, request_id: &str) -> Option<&TrackedRequest> {
        let i = *self.index.get(request_id)?;
        self.requests.get(i)
    }

    pub fn get_mut(&mut self, request_id: &str) -> Option<&mut TrackedRequest> {
        let i = *self.index.get(request_id)?;
        self.requests.get_mut(i)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedRequest> {
        self.requests.iter()
    }
}

/// Outcome of scanning one log stream
///
/// **Public** - immutable once the scanner returns it
#[derive(Debug, Clone, Serialize)]
pub struct StreamResult {
    source: String,
    passes: usize,
    tracker: RequestTracker,
}

impl StreamResult {
    pub(crate) fn new(source: impl Into<String>, passes: usize, tracker: RequestTracker) -> Self {
        Self {
            source: source.into(),
            passes,
            tracker,
        }
    }

    /// Name of the scanned source (usually its path)
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of passes made over the stream (1 when nothing was slow)
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// True when the stream held no slow warnings at all
    pub fn has_correlation_data(&self) -> bool {
        !self.tracker.is_empty()
    }

    pub fn get(&self, request_id: &str) -> Option<&TrackedRequest> {
        self.tracker.get(request_id)
    }

    pub fn requests(&self) -> impl Iterator<Item = &TrackedRequest> {
        self.tracker.iter()
    }

    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_timestamp;

    fn warning(request_id: &str, peers: &[&str]) -> SlowWarning {
        SlowWarning {
            timestamp: parse_timestamp("2024-03-01 12:00:30.0").unwrap(),
            request_id: request_id.to_string(),
            peers: peers.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_new_dedupes_peers_in_order() {
        let request = TrackedRequest::new("client.1.0:1".into(), ["3", "7", "3", "1"].map(String::from));
        assert_eq!(request.implicated_peers(), ["3", "7", "1"]);
        assert!(request.fast_peers().is_empty());
        assert!(request.start_time().is_none());
    }

    #[test]
    fn test_first_start_time_wins() {
        let mut request = TrackedRequest::new("client.1.0:1".into(), Vec::new());
        let first = parse_timestamp("2024-03-01 12:00:00.0").unwrap();
        let second = parse_timestamp("2024-03-01 12:00:05.0").unwrap();

        assert!(request.record_start(first));
        assert!(!request.record_start(second));
        assert_eq!(request.start_time(), Some(first));
    }

    #[test]
    fn test_exonerate_moves_peer_once() {
        let mut request = TrackedRequest::new("client.1.0:1".into(), ["1", "2", "3"].map(String::from));
        request.exonerate("2");
        request.exonerate("2");
        request.exonerate("9");

        assert_eq!(request.implicated_peers(), ["1", "3"]);
        assert_eq!(request.fast_peers(), ["2", "9"]);
    }

    #[test]
    fn test_slow_peers_require_start_time() {
        let mut request = TrackedRequest::new("client.1.0:1".into(), ["1"].map(String::from));
        assert!(request.slow_peers().is_empty());

        request.record_start(parse_timestamp("2024-03-01 12:00:00.0").unwrap());
        assert_eq!(request.slow_peers(), ["1"]);
    }

    #[test]
    fn test_tracker_first_warning_wins() {
        let mut tracker = RequestTracker::new();
        assert!(tracker.track(warning("client.1.0:1", &["1", "2"])));
        assert!(!tracker.track(warning("client.1.0:1", &["5"])));
        assert!(tracker.track(warning("client.2.0:1", &["5"])));

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.get("client.1.0:1").unwrap().implicated_peers(), ["1", "2"]);

        let order: Vec<_> = tracker.iter().map(|r| r.request_id()).collect();
        assert_eq!(order, ["client.1.0:1", "client.2.0:1"]);
    }
}
