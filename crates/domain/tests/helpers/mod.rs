#![allow(dead_code)]
use ferrous_lookup_domain::{DnsClass, QueryMessage, Question, RecordType};

pub fn question(name: &str, record_type: RecordType) -> Question {
    Question::new(name, record_type, DnsClass::IN).unwrap()
}

pub fn query(name: &str, record_type: RecordType) -> QueryMessage {
    QueryMessage::new(0x1234, question(name, record_type))
}
