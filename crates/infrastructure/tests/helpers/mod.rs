//! Fixture builders shared by the infrastructure integration tests:
//! DNS wire payloads, Ethernet/IPv4/UDP frames, and legacy pcap files.
#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::io::Write;
use std::str::FromStr;

pub fn serialize_message(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

pub fn dns_query_bytes(domain: &str, id: u16) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(domain).unwrap());
    query.set_query_type(RecordType::A);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);
    serialize_message(&message)
}

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
    serialize_message(&message)
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

/// A TCP frame the demultiplexer must skip without error.
pub fn tcp_frame(src_ip: [u8; 4], dst_ip: [u8; 4]) -> Vec<u8> {
    let mut frame = udp_frame(src_ip, dst_ip, 53, 40000, b"ignored");
    frame[14 + 9] = 6; // TCP
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
