//! The per-file decode pipeline: gzip capture stream -> pcap frames ->
//! Ethernet/IPv4/UDP demultiplexer -> DNS wire decoder -> normalized
//! records, in strict stream order.
pub mod decoder;
pub mod frame;
pub mod normalizer;
pub mod stream;

use capdns_domain::{CaptureJob, DnsRecord, DomainError, FileStats};
use chrono::DateTime;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapBlock, LegacyPcapReader, PcapBlockOwned, PcapError};
use tokio::sync::mpsc;

const PCAP_BUFFER_SIZE: usize = 65536;

/// Stream every frame of one capture file through the decode pipeline,
/// sending normalized response records into `sender`. Blocking; the
/// worker drives this on a blocking thread while the batcher's flush
/// task consumes the channel.
///
/// Malformed frames are counted, never fatal. Only an unreadable stream
/// or a closed record channel aborts the file.
pub fn process_capture(
    job: &CaptureJob,
    sender: &mpsc::Sender<DnsRecord>,
) -> Result<FileStats, DomainError> {
    let reader = stream::open_capture(&job.path)?;
    let mut pcap = LegacyPcapReader::new(PCAP_BUFFER_SIZE, reader)
        .map_err(|e| DomainError::CaptureStream(format!("not a legacy pcap stream: {e:?}")))?;

    let mut stats = FileStats::default();
    loop {
        match pcap.next() {
            Ok((offset, block)) => {
                if let PcapBlockOwned::Legacy(ref frame) = block {
                    stats.frames += 1;
                    inspect_frame(frame, job, sender, &mut stats)?;
                }
                drop(block);
                pcap.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                pcap.refill()
                    .map_err(|e| DomainError::CaptureStream(format!("refill failed: {e:?}")))?;
            }
            Err(e) => {
                return Err(DomainError::CaptureStream(format!("pcap parse error: {e:?}")));
            }
        }
    }
    Ok(stats)
}

fn inspect_frame(
    frame: &LegacyPcapBlock,
    job: &CaptureJob,
    sender: &mpsc::Sender<DnsRecord>,
    stats: &mut FileStats,
) -> Result<(), DomainError> {
    // Capture timestamps are (seconds, microseconds); a usec field past
    // one second cannot form a valid instant.
    if frame.ts_usec >= 1_000_000 {
        stats.malformed += 1;
        return Ok(());
    }
    let Some(time) = DateTime::from_timestamp(i64::from(frame.ts_sec), frame.ts_usec * 1000)
    else {
        stats.malformed += 1;
        return Ok(());
    };

    match frame::demux(frame.data) {
        Err(frame::TruncatedFrame) => stats.malformed += 1,
        Ok(None) => {}
        Ok(Some(datagram)) => match decoder::decode(datagram.payload) {
            Err(_) => stats.malformed += 1,
            Ok(message) => {
                stats.decoded += 1;
                if let Some(record) = normalizer::normalize(
                    &message,
                    job,
                    time,
                    datagram.src_ip,
                    datagram.dst_ip,
                ) {
                    stats.responses += 1;
                    sender.blocking_send(record).map_err(|_| {
                        DomainError::CaptureStream("record writer channel closed".to_string())
                    })?;
                }
            }
        },
    }
    Ok(())
}
