use osd_hunter::scanner::{LogScanner, ScanConfig};
use osd_hunter::utils::error::ScanError;
use pretty_assertions::assert_eq;
use std::io::Cursor;
use std::path::Path;

const SEND: &str = "2024-05-02 10:15:00.100 7fab 1 -- 10.1.0.1:6800/7 <== client.5040 10.1.0.50:0/9 3 ==== osd_op(client.5040.0:812 3.1a rbd_data.ab [write 0~65536]) v8 ==== 250+0+65536 (1 0 0) 0x55\n";
const SLOW: &str = "2024-05-02 10:15:32.0 7fab 0 log_channel(cluster) log [WRN] : slow request 31.9 seconds old, received at 2024-05-02 10:15:00.100: osd_op(client.5040.0:812 3.1a rbd_data.ab [write 0~65536]) currently waiting for subops from 1,2,3\n";

fn reply(at: &str, osd: u32) -> String {
    format!("2024-05-02 {at} 7fab 1 -- 10.1.0.1:6800/7 <== osd.{osd} 10.1.0.{osd}:6801/2 44 ==== osd_repop_reply(client.5040.0:812 3.1a ondisk, result = 0) v2 ==== 83+0+0 (9 0 0) 0x66\n")
}

#[test]
fn test_fast_peer_removed_and_others_stay() {
    let text = format!("{SEND}{}{SLOW}", reply("10:15:00.9", 2));
    let result = LogScanner::default()
        .scan("osd", Cursor::new(text.into_bytes()))
        .unwrap();

    let request = result.get("client.5040.0:812").unwrap();
    assert_eq!(request.implicated_peers(), ["1", "3"]);
    assert_eq!(request.fast_peers(), ["2"]);
    assert_eq!(request.slow_peers(), ["1", "3"]);
}

#[test]
fn test_slow_peer_stays_implicated() {
    let text = format!("{SEND}{}{}{SLOW}", reply("10:15:10.100", 2), reply("10:15:25.0", 3));
    let result = LogScanner::default()
        .scan("osd", Cursor::new(text.into_bytes()))
        .unwrap();

    let request = result.get("client.5040.0:812").unwrap();
    assert_eq!(request.implicated_peers(), ["1", "2", "3"]);
    assert!(request.fast_peers().is_empty());
}

#[test]
fn test_repeated_fast_reply_does_not_duplicate() {
    let text = format!("{SEND}{}{}{SLOW}", reply("10:15:01.0", 1), reply("10:15:02.0", 1));
    let result = LogScanner::default()
        .scan("osd", Cursor::new(text.into_bytes()))
        .unwrap();

    assert_eq!(result.get("client.5040.0:812").unwrap().fast_peers(), ["1"]);
}

#[test]
fn test_second_warning_does_not_change_peers() {
    let later = SLOW
        .replacen("10:15:32.0", "10:16:02.0", 1)
        .replace("from 1,2,3", "from 8,9");
    let text = format!("{SEND}{SLOW}{later}");
    let result = LogScanner::default()
        .scan("osd", Cursor::new(text.into_bytes()))
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(
        result.get("client.5040.0:812").unwrap().implicated_peers(),
        ["1", "2", "3"]
    );
}

#[test]
fn test_untracked_requests_are_ignored() {
    let other = SEND.replace("client.5040.0:812", "client.5040.0:900");
    let text = format!("{other}{SLOW}");
    let result = LogScanner::default()
        .scan("osd", Cursor::new(text.into_bytes()))
        .unwrap();

    assert_eq!(result.len(), 1);
    assert!(result.get("client.5040.0:900").is_none());
    assert!(result.get("client.5040.0:812").unwrap().start_time().is_none());
}

#[test]
fn test_scan_path_gzip_matches_plain() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let text = format!("{SEND}{}{SLOW}", reply("10:15:03.0", 3));
    let dir = tempfile::tempdir().unwrap();

    let plain = dir.path().join("ceph-osd.0.log");
    std::fs::write(&plain, &text).unwrap();

    let gz = dir.path().join("ceph-osd.0.log.1.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&gz).unwrap(), Compression::fast());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let scanner = LogScanner::new(ScanConfig::default());
    let from_plain = scanner.scan_path(&plain).unwrap();
    let from_gz = scanner.scan_path(&gz).unwrap();

    let peers = |r: &osd_hunter::scanner::StreamResult| {
        r.get("client.5040.0:812").unwrap().implicated_peers().to_vec()
    };
    assert_eq!(peers(&from_plain), peers(&from_gz));
    assert_eq!(peers(&from_plain), vec!["1", "2"]);
    assert_eq!(from_gz.passes(), 2);
}

#[test]
fn test_scan_missing_path() {
    let err = LogScanner::default()
        .scan_path(Path::new("/definitely/not/here/ceph-osd.4.log"))
        .unwrap_err();

    let ScanError::SourceUnreadable { path, .. } = err;
    assert_eq!(path, Path::new("/definitely/not/here/ceph-osd.4.log"));
}
