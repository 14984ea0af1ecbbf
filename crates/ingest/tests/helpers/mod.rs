//! Fixture builders and in-memory store doubles for the worker and
//! dispatcher integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use capdns_application::ports::{ProcessedFileStore, RecordStore};
use capdns_domain::{DnsRecord, DomainError};
use flate2::write::GzEncoder;
use flate2::Compression;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

pub fn dns_response_bytes(domain: &str, id: u16) -> Vec<u8> {
    let name = Name::from_str(domain).unwrap();
    let mut query = Query::new();
    query.set_name(name.clone());
    query.set_query_type(RecordType::A);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Response, OpCode::Query);
    message.set_recursion_desired(true);
    message.set_recursion_available(true);
    message.add_query(query);
    message.add_answer(Record::from_rdata(
        name,
        300,
        RData::A(A::new(192, 0, 2, 10)),
    ));

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

/// Ethernet + fixed IPv4 + UDP framing around `payload`.
pub fn udp_frame(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut frame = vec![0u8; 14];
    frame[12] = 0x08; // ethertype IPv4

    let mut ip = [0u8; 20];
    ip[0] = 0x45;
    ip[9] = 17; // UDP
    ip[12..16].copy_from_slice(&src_ip);
    ip[16..20].copy_from_slice(&dst_ip);
    frame.extend_from_slice(&ip);

    let udp_len = (8 + payload.len()) as u16;
    frame.extend_from_slice(&src_port.to_be_bytes());
    frame.extend_from_slice(&dst_port.to_be_bytes());
    frame.extend_from_slice(&udp_len.to_be_bytes());
    frame.extend_from_slice(&[0, 0]);
    frame.extend_from_slice(payload);
    frame
}

/// Legacy pcap file (little-endian, LINKTYPE_ETHERNET) from
/// `(ts_sec, ts_usec, frame)` triples.
pub fn pcap_bytes(frames: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes()); // magic
    out.extend_from_slice(&2u16.to_le_bytes()); // version major
    out.extend_from_slice(&4u16.to_le_bytes()); // version minor
    out.extend_from_slice(&0i32.to_le_bytes()); // thiszone
    out.extend_from_slice(&0u32.to_le_bytes()); // sigfigs
    out.extend_from_slice(&65535u32.to_le_bytes()); // snaplen
    out.extend_from_slice(&1u32.to_le_bytes()); // network: Ethernet

    for (ts_sec, ts_usec, data) in frames {
        out.extend_from_slice(&ts_sec.to_le_bytes());
        out.extend_from_slice(&ts_usec.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
    }
    out
}

pub fn gzipped(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// Write a capture holding `responses` server answers from 198.51.100.53
/// to distinct clients, named `pcap.<region>.<ts_sec>` under `dir`.
pub fn write_capture(dir: &std::path::Path, region: &str, ts_sec: u32, responses: u16) -> PathBuf {
    let frames: Vec<(u32, u32, Vec<u8>)> = (0..responses)
        .map(|i| {
            let payload = dns_response_bytes("example.com.", 0x1000 + i);
            let frame = udp_frame(
                [198, 51, 100, 53],
                [10, 0, 0, (i % 250) as u8 + 1],
                53,
                33000 + i,
                &payload,
            );
            (ts_sec, 1000 * i as u32, frame)
        })
        .collect();

    let path = dir.join(format!("pcap.{region}.{ts_sec}"));
    std::fs::write(&path, pcap_bytes(&frames)).unwrap();
    path
}

/// Record store double: counts inserts, optionally sleeping or refusing
/// each batch.
#[derive(Default)]
pub struct MemoryRecordStore {
    pub records: Mutex<Vec<DnsRecord>>,
    pub insert_delay: Option<Duration>,
    pub refuse_writes: bool,
}

impl MemoryRecordStore {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_batch(&self, records: &[DnsRecord]) -> Result<u64, DomainError> {
        if let Some(delay) = self.insert_delay {
            tokio::time::sleep(delay).await;
        }
        if self.refuse_writes {
            return Err(DomainError::DatabaseError("write refused".to_string()));
        }
        let mut guard = self.records.lock().unwrap();
        guard.extend_from_slice(records);
        Ok(records.len() as u64)
    }
}

/// Processed-file store double backed by a `HashSet`.
#[derive(Default)]
pub struct MemoryProcessedStore {
    pub seen: Mutex<HashSet<String>>,
}

impl MemoryProcessedStore {
    pub fn with_marked(filenames: &[&str]) -> Self {
        Self {
            seen: Mutex::new(filenames.iter().map(|f| f.to_string()).collect()),
        }
    }

    pub fn is_marked(&self, filename: &str) -> bool {
        self.seen.lock().unwrap().contains(filename)
    }
}

#[async_trait]
impl ProcessedFileStore for MemoryProcessedStore {
    async fn contains(&self, filename: &str) -> Result<bool, DomainError> {
        Ok(self.seen.lock().unwrap().contains(filename))
    }

    async fn insert(&self, filename: &str) -> Result<(), DomainError> {
        self.seen.lock().unwrap().insert(filename.to_string());
        Ok(())
    }
}
