use async_trait::async_trait;
use capdns_domain::{DnsRecord, DomainError};

/// Append-only store for normalized DNS response records.
///
/// `insert_batch` must be durable on return: the batcher counts a record
/// as written only once the call succeeds, and a job is never reported
/// finished before every record it produced has been counted.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Bulk-write a batch, returning the number of rows actually inserted.
    async fn insert_batch(&self, records: &[DnsRecord]) -> Result<u64, DomainError>;
}
