//! OSD Hunter
//!
//! Finds the Ceph OSDs responsible for slow requests by correlating
//! slow-request warnings with message receipts in OSD logs.
//!
//! This crate provides the core implementation for the
//! `osd-hunter` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! osd-hunter 3              # scan /var/log/ceph/ceph-osd.3.log
//! osd-hunter --all --zip    # every OSD log, rotated ones included
//! ```
//!
//! ## Library use
//!
//! ```ignore
//! let scanner = LogScanner::new(ScanConfig::default());
//! let result = scanner.scan_path(Path::new("/var/log/ceph/ceph-osd.3.log"))?;
//! if let Some(report) = build_report([&result]) {
//!     print!("{}", render_report(&report));
//! }
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod scanner;
pub mod utils;
