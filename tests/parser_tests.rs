use osd_hunter::parser::{classify_line, parse_timestamp, Actor, LogEvent, Timestamp};
use osd_hunter::utils::error::ParseError;

#[test]
fn test_fraction_normalization() {
    let short: Timestamp = "2024-05-02 12:00:00.5".parse().unwrap();
    let long: Timestamp = "2024-05-02 12:00:00.500000".parse().unwrap();
    assert_eq!(short, long);
}

#[test]
fn test_timestamp_ordering() {
    let a = parse_timestamp("2024-05-02 23:59:59.999999").unwrap();
    let b = parse_timestamp("2024-05-03 00:00:00.0").unwrap();
    assert!(a < b);
    assert_eq!((b - a).num_microseconds(), Some(1));
}

#[test]
fn test_missing_fraction_is_malformed() {
    assert!(matches!(
        parse_timestamp("2024-05-02 12:00:00"),
        Err(ParseError::MalformedTimestamp(_))
    ));
}

#[test]
fn test_classify_peer_reply_with_multi_digit_ids() {
    let line = "2024-05-02 12:00:01.25 7fab 1 -- 10.0.0.1:6800/1 <== osd.117 10.0.0.9:6801/4 9 ==== osd_repop_reply(client.880123.0:4077 7.3f ondisk) v2";

    match classify_line(line) {
        Some(Ok(LogEvent::IoCompletion(completion))) => {
            assert_eq!(completion.actor, Actor::Peer("117".to_string()));
            assert_eq!(completion.request_id, "client.880123.0:4077");
        }
        other => panic!("unexpected classification: {:?}", other),
    }
}

#[test]
fn test_classify_slow_warning_single_peer() {
    let line = "2024-05-02 12:00:31.0 7fab 0 log [WRN] : slow request 30.5 seconds old: osd_op(client.4.0:1 1.0) currently waiting for subops from 12";

    match classify_line(line) {
        Some(Ok(LogEvent::SlowWarning(warning))) => {
            assert_eq!(warning.request_id, "client.4.0:1");
            assert_eq!(warning.peers, vec!["12".to_string()]);
        }
        other => panic!("unexpected classification: {:?}", other),
    }
}
