use super::decoder::DecodedMessage;
use capdns_domain::{CaptureJob, DnsRecord};
use chrono::{DateTime, Utc};
use std::net::Ipv4Addr;

/// Map a decoded message to the persisted record shape, or `None` when
/// the message is a query — only responses are persisted.
///
/// The capture instant is localized to the recording node's time zone.
/// The DNS requester is the UDP *destination* of a response frame, so
/// the demultiplexed endpoints swap roles here.
pub fn normalize(
    message: &DecodedMessage,
    job: &CaptureJob,
    time: DateTime<Utc>,
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
) -> Option<DnsRecord> {
    if !message.is_response {
        return None;
    }

    Some(DnsRecord {
        node: job.region.clone(),
        time: time.with_timezone(&job.timezone),
        requester_ip: dst_ip,
        responder_ip: src_ip,
        flags: message.flags,
        questions: message.questions.clone(),
        dnssec: message.dnssec,
        answer_count: message.answer_count,
        authority_count: message.authority_count,
        additional_count: message.additional_count,
    })
}
