mod dns_exchange;
mod message_codec;

pub use dns_exchange::DnsExchange;
pub use message_codec::MessageCodec;

// Re-export for convenience
pub use hickory_proto::op::Message;
