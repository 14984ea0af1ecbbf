use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One entry of the DNS question section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub name: String,
    #[serde(rename = "type")]
    pub query_type: u16,
    pub class: u16,
}

/// The DNS header flags preserved on every persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags {
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub response_code: u16,
}

/// A normalized DNS response, the unit persisted to the records store.
///
/// `time` is the capture timestamp localized to the recording node's time
/// zone. Endpoint addresses are canonically IPv4: the demultiplexer only
/// yields IPv4/UDP traffic, and the store keeps them as dotted-decimal
/// strings. `requester_ip` is the UDP destination of the response frame
/// (the host that asked), `responder_ip` the source.
#[derive(Debug, Clone, PartialEq)]
pub struct DnsRecord {
    pub node: String,
    pub time: DateTime<Tz>,
    pub requester_ip: Ipv4Addr,
    pub responder_ip: Ipv4Addr,
    pub flags: HeaderFlags,
    pub questions: Vec<Question>,
    pub dnssec: bool,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_serializes_with_wire_field_names() {
        let q = Question {
            name: "example.com.".to_string(),
            query_type: 1,
            class: 1,
        };
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"type\":1"));
        assert!(json.contains("\"class\":1"));
    }
}
