mod helpers;

use ferrous_lookup_application::ports::MessageCodec;
use ferrous_lookup_domain::{DomainError, EdnsOption, RecordType};
use ferrous_lookup_infrastructure::dns::WireCodec;
use helpers::{build_mock_response, query, MockBehavior, MOCK_ANSWER};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RData;
use std::net::Ipv4Addr;

#[test]
fn test_pack_with_empty_opt_is_40_bytes() {
    let mut message = query("example.com", RecordType::A);
    message.ensure_opt(false);

    let bytes = WireCodec.pack(&message).unwrap();
    assert_eq!(bytes.len(), 40);
    assert_eq!(&bytes[10..12], &[0x00, 0x01]);
}

#[test]
fn test_padding_length_excludes_option_header() {
    let mut message = query("example.com", RecordType::A);
    message.ensure_opt(false);
    let unpadded = WireCodec.pack(&message).unwrap().len();

    if let Some(opt) = message.opt_mut() {
        opt.push(EdnsOption::padding_for(unpadded));
    }
    let padded = WireCodec.pack(&message).unwrap();

    // 88 pad bytes take 40 to 128; the 4-byte option header is not counted
    assert_eq!(padded.len() - unpadded, 4 + 88);
    assert_eq!(padded.len(), 132);
}

#[test]
fn test_pack_without_opt_has_no_additional() {
    let bytes = WireCodec.pack(&query("example.com", RecordType::MX)).unwrap();
    assert_eq!(&bytes[10..12], &[0x00, 0x00]);
    assert_eq!(&bytes[bytes.len() - 4..], &[0x00, 0x0f, 0x00, 0x01]);
}

#[test]
fn test_packed_query_parses_back() {
    let mut message = query("www.example.org", RecordType::AAAA);
    message.ensure_opt(true).add_subnet("203.0.113.0/24").unwrap();

    let bytes = WireCodec.pack(&message).unwrap();
    let parsed = WireCodec.unpack(&bytes).unwrap();

    assert_eq!(bytes[2] & 0x01, 0x01);
    assert_eq!(parsed.queries().len(), 1);
    assert_eq!(parsed.queries()[0].name().to_string(), "www.example.org.");
    assert_eq!(u16::from(parsed.queries()[0].query_type()), 28);
    assert_eq!(&bytes[0..2], &0x4242u16.to_be_bytes());
}

#[test]
fn test_unpack_mock_reply() {
    let request = WireCodec.pack(&query("example.com", RecordType::A)).unwrap();
    let reply = build_mock_response(&request, MockBehavior::Answer).unwrap();

    let message = WireCodec.unpack(&reply).unwrap();
    assert_eq!(message.response_code(), ResponseCode::NoError);
    assert_eq!(message.answers().len(), 1);

    match message.answers()[0].data() {
        RData::A(a) => assert_eq!(a.0, Ipv4Addr::from(MOCK_ANSWER)),
        other => panic!("Expected A record, got {:?}", other),
    }
}

#[test]
fn test_unpack_garbage_is_codec_error() {
    let result = WireCodec.unpack(&[0x12, 0x34, 0x81]);
    assert!(matches!(result, Err(DomainError::Codec(_))));
}
