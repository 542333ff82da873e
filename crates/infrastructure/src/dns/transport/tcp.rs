//! TCP Transport for DNS queries (RFC 1035 §4.2.2)
//!
//! Every message is preceded by a two-byte big-endian length. One connection
//! is opened per query.

use super::{DnsTransport, HostResolver, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_lookup_domain::{DomainError, UpstreamAddr};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub struct TcpTransport {
    upstream_addr: UpstreamAddr,
    resolver: HostResolver,
}

impl TcpTransport {
    pub fn new(upstream_addr: UpstreamAddr, resolver: HostResolver) -> Self {
        Self {
            upstream_addr,
            resolver,
        }
    }
}

pub(crate) async fn connect(server_addr: SocketAddr) -> Result<TcpStream, DomainError> {
    let stream = TcpStream::connect(server_addr).await.map_err(|e| {
        DomainError::Transport(format!(
            "Connection refused by {}: {}",
            server_addr, e
        ))
    })?;

    stream.set_nodelay(true).map_err(|e| {
        DomainError::Transport(format!(
            "Failed to set TCP_NODELAY on {}: {}",
            server_addr, e
        ))
    })?;

    Ok(stream)
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        let server_addr = self.resolver.resolve(&self.upstream_addr).await?;
        let mut stream = connect(server_addr).await?;

        send_with_length_prefix(&mut stream, message_bytes).await?;
        debug!(server = %server_addr, message_len = message_bytes.len(), "TCP query sent");

        let response_bytes = read_with_length_prefix(&mut stream).await?;
        debug!(server = %server_addr, response_len = response_bytes.len(), "TCP response received");

        Ok(TransportResponse {
            bytes: Bytes::from(response_bytes),
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::Codec(format!(
            "Message too large for TCP framing: {} bytes",
            message_bytes.len()
        ))
    })?;

    let mut framed = Vec::with_capacity(2 + message_bytes.len());
    framed.extend_from_slice(&length.to_be_bytes());
    framed.extend_from_slice(message_bytes);

    stream
        .write_all(&framed)
        .await
        .map_err(|e| DomainError::Transport(format!("Failed to write DNS message: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DomainError::Transport(format!("Failed to flush stream: {}", e)))?;

    Ok(())
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await.map_err(|e| {
        DomainError::Transport(format!("Failed to read response length: {}", e))
    })?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    if response_len == 0 || response_len > MAX_TCP_MESSAGE_SIZE {
        return Err(DomainError::Transport(format!(
            "Invalid response length: {} bytes",
            response_len
        )));
    }

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await.map_err(|e| {
        DomainError::Transport(format!("Failed to read response body: {}", e))
    })?;

    Ok(response)
}
