use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid capture file name: {0}")]
    InvalidCaptureName(String),

    #[error("Unknown region code: {0}")]
    UnknownRegion(String),

    #[error("Unknown time zone id '{zone}' for region {region}")]
    UnknownTimeZone { region: String, zone: String },

    #[error("Failed to read region table {0}: {1}")]
    RegionTableRead(String, String),

    #[error("Failed to parse region table {0}: {1}")]
    RegionTableParse(String, String),

    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Capture stream error: {0}")]
    CaptureStream(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Record writer stalled: {0}")]
    WriterStalled(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
