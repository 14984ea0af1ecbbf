use crate::errors::DomainError;
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

/// One recording node as described by the offline region-table generator:
/// coordinates plus the IANA time zone resolved from them.
#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "timezoneId")]
    pub timezone_id: String,
    #[serde(rename = "timezoneName")]
    pub timezone_name: String,
}

/// Mapping from region code (as embedded in capture file names) to the
/// node's location and time zone. Loaded once at startup; a missing or
/// unparsable table is a fatal setup error.
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: HashMap<String, Region>,
}

impl RegionTable {
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::RegionTableRead(path.display().to_string(), e.to_string())
        })?;
        Self::from_json(&contents)
            .map_err(|e| DomainError::RegionTableParse(path.display().to_string(), e))
    }

    pub fn from_json(contents: &str) -> Result<Self, String> {
        let regions: HashMap<String, Region> =
            serde_json::from_str(contents).map_err(|e| e.to_string())?;
        Ok(Self { regions })
    }

    pub fn get(&self, code: &str) -> Option<&Region> {
        self.regions.get(code)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Resolve a region code to its `chrono-tz` time zone. An absent region
    /// or a zone id chrono-tz does not know is an error for the job being
    /// bound, never a silent UTC default.
    pub fn resolve_timezone(&self, code: &str) -> Result<Tz, DomainError> {
        let region = self
            .get(code)
            .ok_or_else(|| DomainError::UnknownRegion(code.to_string()))?;
        Tz::from_str(&region.timezone_id).map_err(|_| DomainError::UnknownTimeZone {
            region: code.to_string(),
            zone: region.timezone_id.clone(),
        })
    }
}
