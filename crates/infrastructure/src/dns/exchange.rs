use super::transport::create_transport;
use async_trait::async_trait;
use ferrous_lookup_application::ports::{DnsExchange, Message, MessageCodec};
use ferrous_lookup_domain::{DomainError, QueryMessage, QueryOptions, ServerDescriptor};
use std::sync::Arc;
use tracing::debug;

/// Sends queries over the transport the server descriptor selects.
pub struct TransportExchange {
    codec: Arc<dyn MessageCodec>,
}

impl TransportExchange {
    pub fn new(codec: Arc<dyn MessageCodec>) -> Self {
        Self { codec }
    }
}

#[async_trait]
impl DnsExchange for TransportExchange {
    async fn exchange(
        &self,
        server: &ServerDescriptor,
        options: &QueryOptions,
        query: &QueryMessage,
    ) -> Result<Message, DomainError> {
        let request_bytes = self.codec.pack(query)?;
        let transport = create_transport(server, options)?;

        debug!(
            server = %server,
            protocol = transport.protocol_name(),
            message_len = request_bytes.len(),
            "Sending query"
        );

        let response = transport
            .send(&request_bytes, options.timeout, &server.to_string())
            .await?;

        let reply_id = reply_id(&response.bytes)?;
        if reply_id != query.id {
            return Err(DomainError::Transport(format!(
                "{} replied with ID {} to query {}",
                server, reply_id, query.id
            )));
        }

        let message = self.codec.unpack(&response.bytes)?;

        debug!(
            server = %server,
            protocol = response.protocol_used,
            response_len = response.bytes.len(),
            rcode = ?message.response_code(),
            answers = message.answers().len(),
            "Response received"
        );

        Ok(message)
    }
}

fn reply_id(bytes: &[u8]) -> Result<u16, DomainError> {
    match bytes {
        [hi, lo, ..] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(DomainError::Codec(format!(
            "reply of {} bytes is too short",
            bytes.len()
        ))),
    }
}
