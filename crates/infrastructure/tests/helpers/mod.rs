#![allow(dead_code)]

pub mod dns_server_mock;
#[cfg(all(
    feature = "dns-over-rustls",
    feature = "dns-over-https",
    feature = "dns-over-quic",
    feature = "dns-over-h3"
))]
pub mod encrypted_server_mock;

use ferrous_lookup_domain::{DnsClass, QueryMessage, Question, RecordType};

pub use dns_server_mock::{build_mock_response, MockBehavior, MockDnsServer, MOCK_ANSWER};
#[cfg(all(
    feature = "dns-over-rustls",
    feature = "dns-over-https",
    feature = "dns-over-quic",
    feature = "dns-over-h3"
))]
pub use encrypted_server_mock::{H3Behavior, MockEncryptedServer, SeenRequest, DNS_MESSAGE};

pub fn query(name: &str, record_type: RecordType) -> QueryMessage {
    QueryMessage::new(
        0x4242,
        Question::new(name, record_type, DnsClass::IN).unwrap(),
    )
}
