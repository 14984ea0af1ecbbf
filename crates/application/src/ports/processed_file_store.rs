use async_trait::async_trait;
use capdns_domain::DomainError;

/// Durable set of capture file names that have already started ingestion.
///
/// This is the sole deduplication mechanism and it is best-effort: the
/// marker is written before processing, so a crash mid-file can leave a
/// marked but partially ingested capture. Inserts must tolerate
/// concurrent duplicates from other workers.
#[async_trait]
pub trait ProcessedFileStore: Send + Sync {
    async fn contains(&self, filename: &str) -> Result<bool, DomainError>;
    async fn insert(&self, filename: &str) -> Result<(), DomainError>;
}
