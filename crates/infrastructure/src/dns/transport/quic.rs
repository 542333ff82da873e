//! DNS-over-QUIC (RFC 9250)
//!
//! One bidirectional stream per query, two-byte length framing as on TCP.
//! The message ID is sent as zero (RFC 9250 §4.2.1) and the original ID is
//! written back into the reply.

use super::tcp::{read_with_length_prefix, send_with_length_prefix};
use super::tls_config::{quic_client_config, ALPN_DOQ};
use super::udp::bind_addr_for;
use super::{DnsTransport, HostResolver, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_lookup_domain::{DomainError, UpstreamAddr};
use std::sync::Arc;
use tracing::debug;

/// Application error code sent when closing the connection (DOQ_NO_ERROR).
const DOQ_NO_ERROR: u32 = 0;

pub struct QuicTransport {
    upstream_addr: UpstreamAddr,
    hostname: Arc<str>,
    resolver: HostResolver,
    client_config: quinn::ClientConfig,
}

impl QuicTransport {
    pub fn new(
        upstream_addr: UpstreamAddr,
        hostname: Arc<str>,
        resolver: HostResolver,
        verify_tls: bool,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            upstream_addr,
            hostname,
            resolver,
            client_config: quic_client_config(verify_tls, &[ALPN_DOQ])?,
        })
    }
}

/// Splits off the message ID and returns a copy of the query with ID zero.
pub(crate) fn zero_message_id(message_bytes: &[u8]) -> Result<(u16, Vec<u8>), DomainError> {
    if message_bytes.len() < 2 {
        return Err(DomainError::Codec("DNS message shorter than its ID".to_string()));
    }
    let id = u16::from_be_bytes([message_bytes[0], message_bytes[1]]);
    let mut zeroed = message_bytes.to_vec();
    zeroed[0] = 0;
    zeroed[1] = 0;
    Ok((id, zeroed))
}

pub(crate) fn restore_message_id(mut response: Vec<u8>, id: u16) -> Vec<u8> {
    if response.len() >= 2 {
        response[..2].copy_from_slice(&id.to_be_bytes());
    }
    response
}

#[async_trait]
impl DnsTransport for QuicTransport {
    async fn send(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        let server_addr = self.resolver.resolve(&self.upstream_addr).await?;
        let (id, query) = zero_message_id(message_bytes)?;

        let mut endpoint = quinn::Endpoint::client(bind_addr_for(&server_addr)).map_err(|e| {
            DomainError::Transport(format!("Failed to create QUIC endpoint: {}", e))
        })?;
        endpoint.set_default_client_config(self.client_config.clone());

        let connection = endpoint
            .connect(server_addr, &self.hostname)
            .map_err(|e| {
                DomainError::Transport(format!(
                    "Failed to initiate QUIC connection to {}: {}",
                    server_addr, e
                ))
            })?
            .await
            .map_err(|e| {
                DomainError::Transport(format!(
                    "QUIC connection to {}({}) failed: {}",
                    self.hostname, server_addr, e
                ))
            })?;

        debug!(server = %server_addr, hostname = %self.hostname, "QUIC connection established");

        let result = async {
            let (mut send_stream, mut recv_stream) = connection.open_bi().await.map_err(|e| {
                DomainError::Transport(format!(
                    "Failed to open QUIC stream to {}: {}",
                    server_addr, e
                ))
            })?;

            send_with_length_prefix(&mut send_stream, &query).await?;
            send_stream.finish().map_err(|e| {
                DomainError::Transport(format!(
                    "Failed to finish QUIC send stream to {}: {}",
                    server_addr, e
                ))
            })?;

            read_with_length_prefix(&mut recv_stream).await
        }
        .await;

        connection.close(quinn::VarInt::from_u32(DOQ_NO_ERROR), b"");
        endpoint.close(quinn::VarInt::from_u32(DOQ_NO_ERROR), b"");

        let response_bytes = restore_message_id(result?, id);
        debug!(server = %server_addr, response_len = response_bytes.len(), "QUIC response received");

        Ok(TransportResponse {
            bytes: Bytes::from(response_bytes),
            protocol_used: "QUIC",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "QUIC"
    }
}
