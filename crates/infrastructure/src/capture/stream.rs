use capdns_domain::DomainError;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a capture file for reading, decompressing transparently when the
/// gzip magic is present. Recording nodes ship captures gzipped, but a
/// plain pcap (e.g. a file already unpacked by hand) is accepted too.
pub fn open_capture(path: &Path) -> Result<Box<dyn Read + Send>, DomainError> {
    let mut file = File::open(path)
        .map_err(|e| DomainError::IoError(format!("{}: {}", path.display(), e)))?;

    let mut magic = [0u8; 2];
    let n = file
        .read(&mut magic)
        .map_err(|e| DomainError::IoError(format!("{}: {}", path.display(), e)))?;
    file.seek(SeekFrom::Start(0))
        .map_err(|e| DomainError::IoError(format!("{}: {}", path.display(), e)))?;

    if n == 2 && magic == GZIP_MAGIC {
        Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
