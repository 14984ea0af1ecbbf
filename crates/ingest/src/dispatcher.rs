use crate::protocol::{WorkerCommand, WorkerEvent};
use crate::worker::{CaptureWorker, WorkerConfig};
use capdns_domain::{
    AggregateStats, CaptureJob, CaptureName, Config, DomainError, RegionTable,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Owns the job queue and the worker pool. Jobs are bound to a region and
/// time zone at dispatch time and handed to whichever worker just became
/// idle; queue order is unspecified (pop from the back). The queue and the
/// pool table are only ever touched from the single control loop in
/// [`Dispatcher::run`].
pub struct Dispatcher {
    config: Config,
    regions: RegionTable,
    queue: Vec<PathBuf>,
}

impl Dispatcher {
    pub fn new(config: Config, regions: RegionTable) -> Self {
        Self {
            config,
            regions,
            queue: Vec::new(),
        }
    }

    /// List one capture directory into the queue. An unreadable directory
    /// is a fatal setup error.
    pub fn enqueue_directory(&mut self, dir: &Path) -> Result<usize, DomainError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| DomainError::IoError(format!("{}: {e}", dir.display())))?;
        let mut added = 0;
        for entry in entries {
            let entry =
                entry.map_err(|e| DomainError::IoError(format!("{}: {e}", dir.display())))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                self.queue.push(entry.path());
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Drive the pool until the queue is drained and every worker has
    /// exited. Cancelling `interrupt` clears the remaining queue without
    /// touching in-flight jobs (the graceful half of the two-stage
    /// shutdown; forcing exit on a second interrupt is the caller's job).
    pub async fn run(mut self, interrupt: CancellationToken) -> AggregateStats {
        let mut totals = AggregateStats::default();

        // Never more workers than jobs.
        let worker_count = self.config.ingest.workers.min(self.queue.len());
        if worker_count == 0 {
            info!("No capture files queued, nothing to do");
            return totals;
        }
        info!(
            workers = worker_count,
            jobs = self.queue.len(),
            "Spawning workers for job queue"
        );

        let (event_tx, mut events) = mpsc::channel(worker_count * 2 + 4);
        let worker_config = WorkerConfig::from(&self.config.database);
        let database_url = self.config.database.url();

        let mut senders: HashMap<usize, mpsc::Sender<WorkerCommand>> = HashMap::new();
        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let (command_tx, command_rx) = mpsc::channel(4);
            let worker = CaptureWorker::connect(
                id,
                database_url.clone(),
                self.config.database.clone(),
                worker_config.clone(),
                command_rx,
                event_tx.clone(),
            );
            senders.insert(id, command_tx);
            handles.push(tokio::spawn(worker.run()));
        }
        drop(event_tx);

        let mut draining = false;
        let mut alive = worker_count;
        while alive > 0 {
            tokio::select! {
                _ = interrupt.cancelled(), if !draining => {
                    draining = true;
                    totals.dropped_jobs += self.queue.len() as u64;
                    warn!(
                        dropped = self.queue.len(),
                        "Interrupt: clearing work queue and waiting for in-flight jobs"
                    );
                    self.queue.clear();
                }
                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else { break };
                    match event {
                        WorkerEvent::Ready { worker_id } => {
                            self.dispatch(worker_id, &mut senders, &mut totals).await;
                        }
                        WorkerEvent::Finished { worker_id, filename, stats, inserted } => {
                            info!(
                                worker_id,
                                file = %filename,
                                frames = stats.frames,
                                responses = stats.responses,
                                malformed = stats.malformed,
                                inserted,
                                jobs_left = self.queue.len(),
                                "Job finished"
                            );
                            totals.absorb(&stats);
                            totals.finished_jobs += 1;
                            self.dispatch(worker_id, &mut senders, &mut totals).await;
                        }
                        WorkerEvent::Duplicate { worker_id, filename } => {
                            warn!(worker_id, file = %filename, "Duplicate entry in datastore, skipping file");
                            totals.duplicate_jobs += 1;
                            self.dispatch(worker_id, &mut senders, &mut totals).await;
                        }
                        WorkerEvent::Failed { worker_id, filename, reason } => {
                            error!(worker_id, file = %filename, reason = %reason, "Job failed");
                            totals.failed_jobs += 1;
                            self.dispatch(worker_id, &mut senders, &mut totals).await;
                        }
                        WorkerEvent::Exited { worker_id } => {
                            senders.remove(&worker_id);
                            alive -= 1;
                            info!(worker_id, alive, "Worker exited");
                        }
                    }
                }
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                // A crashed worker's in-flight job is lost, not re-run.
                error!(error = %e, "Worker task panicked");
                totals.failed_jobs += 1;
            }
        }

        info!(
            frames = totals.frames,
            responses = totals.responses,
            malformed = totals.malformed,
            finished = totals.finished_jobs,
            duplicates = totals.duplicate_jobs,
            failed = totals.failed_jobs,
            dropped = totals.dropped_jobs,
            "Ingestion run complete"
        );
        totals
    }

    /// Hand the next bindable job to `worker_id`, or reap it when the
    /// queue is empty. Files whose name or region cannot be resolved fail
    /// that job only; the queue moves on.
    async fn dispatch(
        &mut self,
        worker_id: usize,
        senders: &mut HashMap<usize, mpsc::Sender<WorkerCommand>>,
        totals: &mut AggregateStats,
    ) {
        let command = loop {
            match self.queue.pop() {
                None => break WorkerCommand::Reap,
                Some(path) => match bind_job(&path, &self.regions) {
                    Ok(job) => {
                        info!(
                            worker_id,
                            file = %job.file_name(),
                            jobs_left = self.queue.len(),
                            "Job dispatched"
                        );
                        break WorkerCommand::Job(job);
                    }
                    Err(e) => {
                        error!(file = %path.display(), error = %e, "Cannot bind capture job");
                        totals.failed_jobs += 1;
                    }
                },
            }
        };

        let Some(sender) = senders.get(&worker_id) else {
            // Exited between event and dispatch; put the job back.
            if let WorkerCommand::Job(job) = command {
                self.queue.push(job.path);
            }
            return;
        };
        if let Err(e) = sender.send(command).await {
            senders.remove(&worker_id);
            if let mpsc::error::SendError(WorkerCommand::Job(job)) = e {
                warn!(worker_id, file = %job.file_name(), "Worker gone, requeueing job");
                self.queue.push(job.path);
            }
        }
    }
}

/// Bind a queued path to its region and time zone. The region code comes
/// from the `pcap.<region>.<timestamp>` name; the zone from the region
/// table.
fn bind_job(path: &Path, regions: &RegionTable) -> Result<CaptureJob, DomainError> {
    let name = CaptureName::parse(path)?;
    let timezone = regions.resolve_timezone(&name.region)?;
    Ok(CaptureJob {
        path: path.to_path_buf(),
        region: name.region,
        timezone,
    })
}
