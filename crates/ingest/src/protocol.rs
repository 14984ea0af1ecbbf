use capdns_domain::{CaptureJob, FileStats};

/// Dispatcher-to-worker control messages.
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    /// Process one capture file.
    Job(CaptureJob),
    /// No more work: close the datastore connection and exit.
    Reap,
}

/// Worker-to-dispatcher lifecycle and job-result messages.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// Sent once, after the worker's datastore connection is live.
    Ready { worker_id: usize },

    /// A job ran to completion and every record it produced is durably
    /// stored.
    Finished {
        worker_id: usize,
        filename: String,
        stats: FileStats,
        inserted: u64,
    },

    /// The file name was already marked processed; nothing was ingested.
    Duplicate { worker_id: usize, filename: String },

    /// The job could not complete (unreadable capture, stalled or failed
    /// writes). Never sent for malformed packets, which are counted, not
    /// fatal.
    Failed {
        worker_id: usize,
        filename: String,
        reason: String,
    },

    /// The worker's final message before its task ends.
    Exited { worker_id: usize },
}
