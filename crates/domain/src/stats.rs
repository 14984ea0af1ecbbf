/// Counters for one capture file, kept in stream order by the worker.
///
/// `frames` counts every pcap record seen. `decoded` counts UDP/53 frames
/// whose DNS payload parsed cleanly; `malformed` counts frames that failed
/// link/network/transport bounds checks or DNS decoding. `responses` counts
/// decoded messages whose header marks them as answers — exactly the number
/// of records handed to the batcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    pub frames: u64,
    pub decoded: u64,
    pub malformed: u64,
    pub responses: u64,
}

/// Run-wide totals accumulated by the dispatcher and printed on exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateStats {
    pub frames: u64,
    pub decoded: u64,
    pub malformed: u64,
    pub responses: u64,
    pub finished_jobs: u64,
    pub duplicate_jobs: u64,
    pub failed_jobs: u64,
    /// Jobs discarded from the queue by a graceful drain.
    pub dropped_jobs: u64,
}

impl AggregateStats {
    pub fn absorb(&mut self, file: &FileStats) {
        self.frames += file.frames;
        self.decoded += file.decoded;
        self.malformed += file.malformed;
        self.responses += file.responses;
    }
}
