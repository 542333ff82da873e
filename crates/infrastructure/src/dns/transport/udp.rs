//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Messages are sent as-is with no framing. The receive buffer matches the
//! payload size advertised in the OPT record. A truncated reply is returned
//! as received; no TCP retry is attempted.

use super::{DnsTransport, HostResolver, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_lookup_domain::{DomainError, UpstreamAddr};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::debug;

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    upstream_addr: UpstreamAddr,
    resolver: HostResolver,
}

impl UdpTransport {
    pub fn new(upstream_addr: UpstreamAddr, resolver: HostResolver) -> Self {
        Self {
            upstream_addr,
            resolver,
        }
    }
}

pub(crate) fn bind_addr_for(server_addr: &SocketAddr) -> SocketAddr {
    if server_addr.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        let server_addr = self.resolver.resolve(&self.upstream_addr).await?;

        let socket = UdpSocket::bind(bind_addr_for(&server_addr))
            .await
            .map_err(|e| DomainError::Transport(format!("Failed to bind UDP socket: {}", e)))?;

        socket.connect(server_addr).await.map_err(|e| {
            DomainError::Transport(format!("Failed to connect UDP socket to {}: {}", server_addr, e))
        })?;

        let bytes_sent = socket.send(message_bytes).await.map_err(|e| {
            DomainError::Transport(format!(
                "Failed to send UDP query to {}: {}",
                server_addr, e
            ))
        })?;

        debug!(server = %server_addr, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let bytes_received = socket.recv(&mut recv_buf).await.map_err(|e| {
            DomainError::Transport(format!(
                "Failed to receive UDP response from {}: {}",
                server_addr, e
            ))
        })?;

        recv_buf.truncate(bytes_received);
        debug!(server = %server_addr, bytes_received, "UDP response received");

        Ok(TransportResponse {
            bytes: Bytes::from(recv_buf),
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
