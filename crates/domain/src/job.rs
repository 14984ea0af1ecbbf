use crate::errors::DomainError;
use chrono_tz::Tz;
use std::path::{Path, PathBuf};

/// One unit of work: a single capture file bound to the recording node's
/// region and time zone. Built by the dispatcher, consumed exactly once
/// by the worker it is sent to.
#[derive(Debug, Clone)]
pub struct CaptureJob {
    pub path: PathBuf,
    pub region: String,
    pub timezone: Tz,
}

impl CaptureJob {
    /// Base file name of the capture, the key used by the duplicate guard.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// The components of a capture file name, `pcap.<region>.<timestamp>[.gz]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureName {
    pub region: String,
    pub timestamp: String,
}

impl CaptureName {
    /// Parse a capture file name. The region is the four characters between
    /// the `pcap.` prefix and a ten-digit capture timestamp; a trailing
    /// `.gz` is accepted. The timestamp is informational only.
    pub fn parse(path: &Path) -> Result<Self, DomainError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .ok_or_else(|| DomainError::InvalidCaptureName(path.display().to_string()))?;

        let invalid = || DomainError::InvalidCaptureName(name.to_string());

        let rest = name.strip_prefix("pcap.").ok_or_else(invalid)?;
        let rest = rest.strip_suffix(".gz").unwrap_or(rest);

        let (region, timestamp) = rest.split_once('.').ok_or_else(invalid)?;
        if region.len() != 4 {
            return Err(invalid());
        }
        if timestamp.len() != 10 || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        Ok(Self {
            region: region.to_string(),
            timestamp: timestamp.to_string(),
        })
    }
}
