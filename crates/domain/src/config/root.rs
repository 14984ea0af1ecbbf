use serde::{Deserialize, Serialize};

use super::database::DatabaseConfig;
use super::errors::ConfigError;
use super::ingest::IngestConfig;
use super::logging::LoggingConfig;

/// Main configuration structure for capdns
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Ingestion configuration (worker pool, region table)
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Datastore configuration (path, batching)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub workers: Option<usize>,
    pub database_path: Option<String>,
    pub regions_path: Option<String>,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. capdns.toml in current directory
    /// 3. /etc/capdns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("capdns.toml").exists() {
            Self::from_file("capdns.toml")?
        } else if std::path::Path::new("/etc/capdns/config.toml").exists() {
            Self::from_file("/etc/capdns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(workers) = overrides.workers {
            self.ingest.workers = workers;
        }
        if let Some(db) = overrides.database_path {
            self.database.path = db;
        }
        if let Some(regions) = overrides.regions_path {
            self.ingest.regions_path = regions;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.workers == 0 {
            return Err(ConfigError::Validation(
                "ingest.workers must be at least 1".to_string(),
            ));
        }
        if self.database.record_batch_size == 0 {
            return Err(ConfigError::Validation(
                "database.record_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
