use capdns_domain::{DomainError, HeaderFlags, Question};
use hickory_proto::op::{Message, MessageType};

/// A DNS message reduced to what the persisted record needs: the header
/// flags, the question section, DNSSEC capability, and section counts.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub is_response: bool,
    pub flags: HeaderFlags,
    pub questions: Vec<Question>,
    pub dnssec: bool,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

/// Parse a UDP payload as a DNS wire-format message.
///
/// Any truncation or malformed record is an error for the caller's
/// malformed counter, never fatal. DNSSEC capability is the presence of
/// an EDNS OPT pseudo-record (type 0x29; the DO bit 0x8000 lives in its
/// extended flags) — no EDNS means `dnssec = false`.
pub fn decode(payload: &[u8]) -> Result<DecodedMessage, DomainError> {
    let message =
        Message::from_vec(payload).map_err(|e| DomainError::MalformedMessage(e.to_string()))?;

    let questions = message
        .queries()
        .iter()
        .map(|q| Question {
            name: q.name().to_utf8(),
            query_type: u16::from(q.query_type()),
            class: u16::from(q.query_class()),
        })
        .collect();

    Ok(DecodedMessage {
        is_response: message.message_type() == MessageType::Response,
        flags: HeaderFlags {
            authoritative: message.authoritative(),
            truncated: message.truncated(),
            recursion_desired: message.recursion_desired(),
            recursion_available: message.recursion_available(),
            response_code: u16::from(message.response_code()),
        },
        questions,
        dnssec: message.extensions().is_some(),
        answer_count: message.answers().len() as u16,
        authority_count: message.name_servers().len() as u16,
        additional_count: message.additionals().len() as u16,
    })
}
