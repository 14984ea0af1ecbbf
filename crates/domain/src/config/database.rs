use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Records accumulated before the batcher hands the buffer to a bulk
    /// write. Larger batches amortize transaction cost; smaller ones bound
    /// the data lost if a worker dies mid-file.
    #[serde(default = "default_record_batch_size")]
    pub record_batch_size: usize,

    #[serde(default = "default_record_channel_capacity")]
    pub record_channel_capacity: usize,

    /// Upper bound on the final-flush wait at end of file. A job whose
    /// writes have not all landed within this window is reported failed,
    /// never finished.
    #[serde(default = "default_flush_timeout_secs")]
    pub flush_timeout_secs: u64,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            record_batch_size: default_record_batch_size(),
            record_channel_capacity: default_record_channel_capacity(),
            flush_timeout_secs: default_flush_timeout_secs(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

fn default_db_path() -> String {
    "./capdns.db".to_string()
}

fn default_record_batch_size() -> usize {
    500
}

fn default_record_channel_capacity() -> usize {
    2048
}

fn default_flush_timeout_secs() -> u64 {
    60
}

fn default_max_connections() -> u32 {
    2
}
