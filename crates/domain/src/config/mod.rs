mod database;
mod errors;
mod ingest;
mod logging;
mod root;

pub use database::DatabaseConfig;
pub use errors::ConfigError;
pub use ingest::IngestConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
