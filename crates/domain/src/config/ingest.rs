use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Worker pool size. Capped by the number of queued capture files at
    /// dispatch time, so idle workers are never spawned.
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_regions_path")]
    pub regions_path: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            regions_path: default_regions_path(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_regions_path() -> String {
    "./regions.json".to_string()
}
