use capdns_application::ports::RecordStore;
use capdns_domain::{DnsRecord, DomainError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Outcome of one batcher run: rows confirmed durable by the store and
/// rows lost to failed bulk writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatcherStats {
    pub inserted: u64,
    pub failed: u64,
}

/// Size-batched, channel-fed writer for one capture job.
///
/// The worker's decode loop feeds records through a bounded channel and is
/// never blocked on a bulk write in flight; the bounded capacity is the
/// only backpressure. A dedicated flush task accumulates records up to the
/// batch size, hands each full buffer to `RecordStore::insert_batch`, and
/// flushes the final partial buffer when the channel closes.
///
/// The ordering guarantee lives in [`RecordBatcher::finish`]: it joins
/// the flush task, so it returns only after every record handed to the
/// batcher has either been durably written or counted as failed.
/// Completion must never be reported upstream before `finish` returns
/// cleanly.
pub struct RecordBatcher {
    handle: JoinHandle<BatcherStats>,
}

impl RecordBatcher {
    /// Returns the batcher and the sole producer handle. The channel
    /// closes when every producer (the returned sender and its clones)
    /// has been dropped.
    pub fn spawn(
        store: Arc<dyn RecordStore>,
        batch_size: usize,
        channel_capacity: usize,
    ) -> (Self, mpsc::Sender<DnsRecord>) {
        let (sender, receiver) = mpsc::channel(channel_capacity);
        let handle = tokio::spawn(flush_loop(store, receiver, batch_size));
        (Self { handle }, sender)
    }

    /// Wait for the flush task to drain, bounded by `timeout`. Producers
    /// must have dropped their senders first. A timeout means writes are
    /// stalled; the caller must report the job failed, never finished.
    pub async fn finish(mut self, timeout: Duration) -> Result<BatcherStats, DomainError> {
        match tokio::time::timeout(timeout, &mut self.handle).await {
            Ok(Ok(stats)) => Ok(stats),
            Ok(Err(e)) => Err(DomainError::WriterStalled(format!(
                "flush task panicked: {e}"
            ))),
            Err(_) => {
                self.handle.abort();
                Err(DomainError::WriterStalled(format!(
                    "final flush did not complete within {}s",
                    timeout.as_secs()
                )))
            }
        }
    }
}

async fn flush_loop(
    store: Arc<dyn RecordStore>,
    mut receiver: mpsc::Receiver<DnsRecord>,
    batch_size: usize,
) -> BatcherStats {
    let mut batch: Vec<DnsRecord> = Vec::with_capacity(batch_size);
    let mut stats = BatcherStats::default();

    while let Some(record) = receiver.recv().await {
        batch.push(record);
        while batch.len() < batch_size {
            match receiver.try_recv() {
                Ok(r) => batch.push(r),
                Err(_) => break,
            }
        }
        if batch.len() >= batch_size {
            flush_batch(store.as_ref(), &mut batch, &mut stats).await;
        }
    }

    // Channel closed: final partial flush.
    if !batch.is_empty() {
        flush_batch(store.as_ref(), &mut batch, &mut stats).await;
    }
    info!(
        inserted = stats.inserted,
        failed = stats.failed,
        "Record flush task drained"
    );
    stats
}

async fn flush_batch(store: &dyn RecordStore, batch: &mut Vec<DnsRecord>, stats: &mut BatcherStats) {
    let count = batch.len();
    match store.insert_batch(batch).await {
        Ok(n) => {
            stats.inserted += n;
            if (n as usize) < count {
                warn!(expected = count, inserted = n, "Bulk write inserted fewer rows than batched");
                stats.failed += count as u64 - n;
            }
        }
        Err(e) => {
            // Not retried here; the shortfall fails the job upstream.
            error!(error = %e, count, "Bulk write failed");
            stats.failed += count as u64;
        }
    }
    batch.clear();
}
