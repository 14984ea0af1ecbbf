use crate::protocol::{WorkerCommand, WorkerEvent};
use capdns_application::ports::{ProcessedFileStore, RecordStore};
use capdns_domain::config::DatabaseConfig;
use capdns_domain::CaptureJob;
use capdns_infrastructure::batcher::RecordBatcher;
use capdns_infrastructure::capture::process_capture;
use capdns_infrastructure::database;
use capdns_infrastructure::repositories::{
    SqliteDnsRecordRepository, SqliteProcessedFileRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Batching knobs a worker hands to its per-job `RecordBatcher`.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub batch_size: usize,
    pub channel_capacity: usize,
    pub flush_timeout: Duration,
}

impl From<&DatabaseConfig> for WorkerConfig {
    fn from(cfg: &DatabaseConfig) -> Self {
        Self {
            batch_size: cfg.record_batch_size,
            channel_capacity: cfg.record_channel_capacity,
            flush_timeout: Duration::from_secs(cfg.flush_timeout_secs),
        }
    }
}

enum StoreSource {
    /// Connect to the datastore on startup; the connection is exclusively
    /// this worker's for its whole life cycle.
    Connect {
        database_url: String,
        db_config: DatabaseConfig,
    },
    /// Pre-built stores, used by tests to substitute mocks.
    Provided {
        records: Arc<dyn RecordStore>,
        processed: Arc<dyn ProcessedFileStore>,
    },
}

/// One capture worker: `Connecting -> Ready -> (Checking-Duplicate ->
/// Processing -> Reporting)* -> Reaped`. Single-threaded per file; the
/// decode loop runs on a blocking thread while the batcher's flush task
/// writes records.
pub struct CaptureWorker {
    id: usize,
    source: StoreSource,
    config: WorkerConfig,
    commands: mpsc::Receiver<WorkerCommand>,
    events: mpsc::Sender<WorkerEvent>,
}

impl CaptureWorker {
    pub fn connect(
        id: usize,
        database_url: String,
        db_config: DatabaseConfig,
        config: WorkerConfig,
        commands: mpsc::Receiver<WorkerCommand>,
        events: mpsc::Sender<WorkerEvent>,
    ) -> Self {
        Self {
            id,
            source: StoreSource::Connect {
                database_url,
                db_config,
            },
            config,
            commands,
            events,
        }
    }

    pub fn with_stores(
        id: usize,
        records: Arc<dyn RecordStore>,
        processed: Arc<dyn ProcessedFileStore>,
        config: WorkerConfig,
        commands: mpsc::Receiver<WorkerCommand>,
        events: mpsc::Sender<WorkerEvent>,
    ) -> Self {
        Self {
            id,
            source: StoreSource::Provided { records, processed },
            config,
            commands,
            events,
        }
    }

    pub async fn run(self) {
        let CaptureWorker {
            id,
            source,
            config,
            mut commands,
            events,
        } = self;

        let mut pool: Option<SqlitePool> = None;
        let (records, processed): (Arc<dyn RecordStore>, Arc<dyn ProcessedFileStore>) =
            match source {
                StoreSource::Provided { records, processed } => (records, processed),
                StoreSource::Connect {
                    database_url,
                    db_config,
                } => match database::create_pool(&database_url, &db_config).await {
                    Ok(p) => {
                        pool = Some(p.clone());
                        (
                            Arc::new(SqliteDnsRecordRepository::new(p.clone())),
                            Arc::new(SqliteProcessedFileRepository::new(p)),
                        )
                    }
                    Err(e) => {
                        error!(worker_id = id, error = %e, "Datastore connection failed");
                        let _ = events.send(WorkerEvent::Exited { worker_id: id }).await;
                        return;
                    }
                },
            };

        if events
            .send(WorkerEvent::Ready { worker_id: id })
            .await
            .is_err()
        {
            return;
        }

        while let Some(command) = commands.recv().await {
            match command {
                WorkerCommand::Job(job) => {
                    let event = process_job(id, &records, &processed, &config, job).await;
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                WorkerCommand::Reap => {
                    debug!(worker_id = id, "Reaped");
                    break;
                }
            }
        }

        if let Some(pool) = pool {
            pool.close().await;
        }
        let _ = events.send(WorkerEvent::Exited { worker_id: id }).await;
    }
}

async fn process_job(
    worker_id: usize,
    records: &Arc<dyn RecordStore>,
    processed: &Arc<dyn ProcessedFileStore>,
    config: &WorkerConfig,
    job: CaptureJob,
) -> WorkerEvent {
    let filename = job.file_name();

    match processed.contains(&filename).await {
        Ok(true) => return WorkerEvent::Duplicate {
            worker_id,
            filename,
        },
        Ok(false) => {}
        Err(e) => {
            return WorkerEvent::Failed {
                worker_id,
                filename,
                reason: e.to_string(),
            }
        }
    }

    // Marked before processing so a concurrently restarted pipeline never
    // double-ingests the same file.
    if let Err(e) = processed.insert(&filename).await {
        return WorkerEvent::Failed {
            worker_id,
            filename,
            reason: e.to_string(),
        };
    }

    let (batcher, sender) = RecordBatcher::spawn(
        records.clone(),
        config.batch_size,
        config.channel_capacity,
    );
    let decode_job = job.clone();
    let decode =
        tokio::task::spawn_blocking(move || process_capture(&decode_job, &sender));

    let stats = match decode.await {
        Ok(Ok(stats)) => Ok(stats),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("decode task panicked: {e}")),
    };

    // Always drain the flush task, even for a failed decode, so records
    // produced before the failure are not abandoned mid-write.
    let flush = batcher.finish(config.flush_timeout).await;

    let stats = match stats {
        Ok(stats) => stats,
        Err(reason) => {
            return WorkerEvent::Failed {
                worker_id,
                filename,
                reason,
            }
        }
    };

    match flush {
        Ok(written) if written.failed == 0 && written.inserted >= stats.responses => {
            info!(
                worker_id,
                file = %filename,
                frames = stats.frames,
                responses = stats.responses,
                malformed = stats.malformed,
                "Capture ingested"
            );
            WorkerEvent::Finished {
                worker_id,
                filename,
                stats,
                inserted: written.inserted,
            }
        }
        Ok(written) => WorkerEvent::Failed {
            worker_id,
            filename,
            reason: format!(
                "short write: {} of {} records durable, {} failed",
                written.inserted, stats.responses, written.failed
            ),
        },
        Err(e) => WorkerEvent::Failed {
            worker_id,
            filename,
            reason: e.to_string(),
        },
    }
}
