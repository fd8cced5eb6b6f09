//! Event matcher for OSD log lines.
//!
//! Two line shapes matter, both anchored at the start of the line:
//!
//! ```text
//! <timestamp> <thread> 0 ... slow ... client.<n>.<n>:<n> ... from <peer>[,<peer>...]
//! <timestamp> <thread> 1 ... <== osd.<n>|client ... client.<n>.<n>:<n> ...
//! ```
//!
//! The first is a slow-request warning naming the peers the request is
//! waiting on. The second is a message receipt: either the client's
//! original op (the originator) or a peer's reply for that op.
//! Every other line is ignored.

use super::timestamp::{parse_timestamp, Timestamp};
use crate::utils::error::ParseError;
use regex::Regex;
use std::sync::OnceLock;

/// Client request identifier, e.g. `client.4123.0:55`. Unique within one log.
pub type RequestId = String;

/// Storage peer (OSD) identifier as written in the log
pub type PeerId = String;

// Character classes are ASCII-only: Unicode digits must never become peer ids.
const SLOW_WARNING_RE: &str = r"^(?P<timestamp>[0-9]+-[0-9]+-[0-9]+[ \t]+[0-9]+:[0-9]+:[0-9]+\.[0-9]+)[ \t]+[A-Za-z0-9_]+[ \t]+0.*slow.*(?P<request>client\.[0-9]+\.[0-9]+:[0-9]+).*from[ \t]+(?P<peers>[0-9]+(?:,[0-9]+)*)";

const IO_COMPLETION_RE: &str = r"^(?P<timestamp>[0-9]+-[0-9]+-[0-9]+[ \t]+[0-9]+:[0-9]+:[0-9]+\.[0-9]+)[ \t]+[A-Za-z0-9_]+[ \t]+1.*<==.*(?P<actor>osd\.[0-9]+|client).*(?P<request>client\.[0-9]+\.[0-9]+:[0-9]+)";

static SLOW_WARNING: OnceLock<Regex> = OnceLock::new();
static IO_COMPLETION: OnceLock<Regex> = OnceLock::new();

fn slow_warning_pattern() -> &'static Regex {
    SLOW_WARNING.get_or_init(|| Regex::new(SLOW_WARNING_RE).expect("slow warning pattern compiles"))
}

fn io_completion_pattern() -> &'static Regex {
    IO_COMPLETION
        .get_or_init(|| Regex::new(IO_COMPLETION_RE).expect("io completion pattern compiles"))
}

/// A slow-request warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlowWarning {
    pub timestamp: Timestamp,
    pub request_id: RequestId,

    /// Peers in the order the log lists them. May contain duplicates.
    pub peers: Vec<PeerId>,
}

/// Who sent the message an I/O completion line reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// The client's original send of the request
    Originator,

    /// A peer's acknowledgement of the request
    Peer(PeerId),
}

/// An I/O completion (message receipt) line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoCompletion {
    pub timestamp: Timestamp,
    pub actor: Actor,
    pub request_id: RequestId,
}

/// Any recognized log event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    SlowWarning(SlowWarning),
    IoCompletion(IoCompletion),
}

/// Match a line against the slow-warning shape
///
/// **Public** - used by the scanner's first pass
///
/// # Returns
/// * `None` - the line is not a slow warning
/// * `Some(Err(..))` - the shape matched but the timestamp is malformed
pub fn match_slow_warning(line: &str) -> Option<Result<SlowWarning, ParseError>> {
    let caps = slow_warning_pattern().captures(line)?;

    Some(parse_timestamp(&caps["timestamp"]).map(|timestamp| SlowWarning {
        timestamp,
        request_id: caps["request"].to_string(),
        peers: caps["peers"].split(',').map(str::to_string).collect(),
    }))
}

/// Match a line against the I/O completion shape
///
/// **Public** - used by the scanner's second pass
///
/// # Returns
/// * `None` - the line is not an I/O completion
/// * `Some(Err(..))` - the shape matched but the timestamp is malformed
pub fn match_io_completion(line: &str) -> Option<Result<IoCompletion, ParseError>> {
    let caps = io_completion_pattern().captures(line)?;

    let actor = match caps["actor"].strip_prefix("osd.") {
        Some(id) => Actor::Peer(id.to_string()),
        None => Actor::Originator,
    };

    Some(parse_timestamp(&caps["timestamp"]).map(|timestamp| IoCompletion {
        timestamp,
        actor,
        request_id: caps["request"].to_string(),
    }))
}

/// Classify a line as either event kind
///
/// **Public** - the two shapes are mutually exclusive (`0` vs `1` marker)
pub fn classify_line(line: &str) -> Option<Result<LogEvent, ParseError>> {
    if let Some(warning) = match_slow_warning(line) {
        return Some(warning.map(LogEvent::SlowWarning));
    }
    match_io_completion(line).map(|completion| completion.map(LogEvent::IoCompletion))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOW: &str = "2024-03-01 12:00:30.000000 7f1a2b3c 0 log_channel(cluster) log [WRN] : slow request 30.0 seconds old, received at 2024-03-01 12:00:00.000000: osd_op(client.4123.0:55 1.2 rbd_data.1 [write 0~4096]) currently waiting for subops from 3,7,3";

    const ORIGINATOR: &str = "2024-03-01 12:00:00.000000 7f1a2b3c 1 -- 10.0.0.1:6800/100 <== client.4123 10.0.0.9:0/200 1 ==== osd_op(client.4123.0:55 1.2 rbd_data.1 [write 0~4096]) v8 ==== 200+0+4096 (1 0 0) 0x5555";

    const PEER_REPLY: &str = "2024-03-01 12:00:02.5 7f1a2b3c 1 -- 10.0.0.1:6800/100 <== osd.7 10.0.0.7:6801/300 12 ==== osd_repop_reply(client.4123.0:55 1.2 ondisk, result = 0) v2 ==== 83+0+0 (2 0 0) 0x6666";

    #[test]
    fn test_match_slow_warning() {
        let warning = match_slow_warning(SLOW).unwrap().unwrap();
        assert_eq!(warning.request_id, "client.4123.0:55");
        assert_eq!(warning.peers, vec!["3", "7", "3"]);
        assert_eq!(warning.timestamp.to_string(), "2024-03-01 12:00:30.000000");
    }

    #[test]
    fn test_slow_warning_needs_zero_marker() {
        let line = SLOW.replacen(" 0 log_channel", " 5 log_channel", 1);
        assert!(match_slow_warning(&line).is_none());
    }

    #[test]
    fn test_match_originator() {
        let completion = match_io_completion(ORIGINATOR).unwrap().unwrap();
        assert_eq!(completion.actor, Actor::Originator);
        assert_eq!(completion.request_id, "client.4123.0:55");
    }

    #[test]
    fn test_match_peer_reply() {
        let completion = match_io_completion(PEER_REPLY).unwrap().unwrap();
        assert_eq!(completion.actor, Actor::Peer("7".to_string()));
        assert_eq!(completion.request_id, "client.4123.0:55");
        assert_eq!(completion.timestamp.microsecond(), 500_000);
    }

    #[test]
    fn test_unrelated_lines_are_ignored() {
        for line in [
            "",
            "2024-03-01 12:00:00.000000 7f1a2b3c 0 osd.3 pg_epoch: 42 state<Started>: active",
            "2024-03-01 12:00:00.000000 7f1a2b3c 1 -- 10.0.0.1:6800/100 --> osd.7 osd_repop",
            "   2024-03-01 12:00:00.000000 7f1a2b3c 1 <== osd.7 client.1.0:1",
        ] {
            assert!(classify_line(line).is_none(), "{line}");
        }
    }

    #[test]
    fn test_non_ascii_digits_are_not_peer_ids() {
        let warning = match_slow_warning(&SLOW.replace("from 3,7,3", "from 3,\u{663}"))
            .unwrap()
            .unwrap();
        assert_eq!(warning.peers, vec!["3"]);

        assert!(match_slow_warning(&SLOW.replace("from 3,7,3", "from \u{663}")).is_none());
        assert!(match_io_completion(&PEER_REPLY.replace("osd.7 ", "osd.\u{967} ")).is_none());
        assert!(classify_line(&SLOW.replacen("2024", "\u{968}024", 1)).is_none());
    }

    #[test]
    fn test_classify_line() {
        assert!(matches!(classify_line(SLOW), Some(Ok(LogEvent::SlowWarning(_)))));
        assert!(matches!(classify_line(PEER_REPLY), Some(Ok(LogEvent::IoCompletion(_)))));
    }

    #[test]
    fn test_malformed_timestamp_on_matched_line() {
        let line = SLOW.replacen("2024-03-01 12:00:30", "2024-03-41 12:00:30", 1);
        assert!(matches!(
            match_slow_warning(&line),
            Some(Err(ParseError::MalformedTimestamp(_)))
        ));
    }
}
