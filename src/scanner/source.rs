//! Opening log sources.
//!
//! The scanner needs to read a stream twice. Plain files are rewound in
//! place; gzip streams cannot seek, so they are decompressed into memory
//! once and scanned from the buffer.

use crate::utils::config::COMPRESSED_EXTENSION;
use crate::utils::error::ScanError;
use flate2::read::MultiGzDecoder;
use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read, Seek};
use std::path::Path;

/// A rewindable line source
pub trait LogStream: BufRead + Seek + Send {}

impl<T: BufRead + Seek + Send> LogStream for T {}

/// Open a log file for scanning
///
/// **Public** - decompresses `.gz` files transparently
///
/// # Errors
/// * `ScanError::SourceUnreadable` - open or decompression failed
pub fn open_log(path: &Path) -> Result<Box<dyn LogStream>, ScanError> {
    let unreadable = |source: io::Error| ScanError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unreadable)?;

    if is_compressed(path) {
        let buffered = buffer_stream(MultiGzDecoder::new(file)).map_err(unreadable)?;
        debug!(
            "Decompressed {} ({} bytes)",
            path.display(),
            buffered.get_ref().len()
        );
        Ok(Box::new(buffered))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read a non-seekable stream fully into a seekable buffer
pub fn buffer_stream<R: Read>(mut reader: R) -> io::Result<Cursor<Vec<u8>>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(Cursor::new(buf))
}

/// Whether `path` names a compressed log
pub fn is_compressed(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == COMPRESSED_EXTENSION)
}
