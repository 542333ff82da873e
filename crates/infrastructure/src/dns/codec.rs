//! DNS wire codec
//!
//! Queries are encoded directly into wire format: header, a single question
//! and the OPT pseudo-record with its options in insertion order. Names are
//! written uncompressed. Replies are decoded with `hickory-proto`.
//!
//! ```text
//! OPT RR:  NAME=0 | TYPE=41 | CLASS=udp payload | TTL=ext-rcode,version,DO | RDLEN | options
//! option:  CODE (u16) | LENGTH (u16) | DATA
//! ```

use ferrous_lookup_application::ports::MessageCodec;
use ferrous_lookup_domain::{DomainError, OptRecord, QueryMessage, Question};
use hickory_proto::op::Message;

const OPT_RECORD_TYPE: u16 = 41;
const FLAG_RD: u16 = 0x0100;
const DO_BIT: u32 = 0x8000;

#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec;

impl WireCodec {
    pub fn new() -> Self {
        Self
    }
}

impl MessageCodec for WireCodec {
    fn pack(&self, message: &QueryMessage) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);

        let flags = if message.recursion_desired { FLAG_RD } else { 0 };
        let arcount: u16 = if message.opt().is_some() { 1 } else { 0 };

        buf.extend_from_slice(&message.id.to_be_bytes());
        buf.extend_from_slice(&flags.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&arcount.to_be_bytes());

        write_question(&mut buf, &message.question)?;

        if let Some(opt) = message.opt() {
            write_opt(&mut buf, opt)?;
        }

        Ok(buf)
    }

    fn unpack(&self, bytes: &[u8]) -> Result<Message, DomainError> {
        Message::from_vec(bytes)
            .map_err(|e| DomainError::Codec(format!("Failed to parse DNS message: {}", e)))
    }
}

fn write_question(buf: &mut Vec<u8>, question: &Question) -> Result<(), DomainError> {
    for label in question.labels() {
        let len = u8::try_from(label.len())
            .ok()
            .filter(|len| *len <= 63)
            .ok_or_else(|| DomainError::Codec(format!("label '{}' is too long", label)))?;
        buf.push(len);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);

    buf.extend_from_slice(&question.record_type.to_u16().to_be_bytes());
    buf.extend_from_slice(&question.class.to_u16().to_be_bytes());
    Ok(())
}

fn write_opt(buf: &mut Vec<u8>, opt: &OptRecord) -> Result<(), DomainError> {
    let ttl: u32 = if opt.dnssec_ok { DO_BIT } else { 0 };
    let rdlen = u16::try_from(opt.rdata_len())
        .map_err(|_| DomainError::Codec("EDNS options exceed 65535 bytes".to_string()))?;

    buf.push(0);
    buf.extend_from_slice(&OPT_RECORD_TYPE.to_be_bytes());
    buf.extend_from_slice(&opt.udp_payload_size.to_be_bytes());
    buf.extend_from_slice(&ttl.to_be_bytes());
    buf.extend_from_slice(&rdlen.to_be_bytes());

    for option in opt.options() {
        let data = option.payload();
        buf.extend_from_slice(&option.code().to_be_bytes());
        buf.extend_from_slice(&(data.len() as u16).to_be_bytes());
        buf.extend_from_slice(&data);
    }
    Ok(())
}
