//! DNS-over-TLS (RFC 7858)
//!
//! TCP framing inside a TLS session. The server name sent in SNI and used
//! for certificate checks is the hostname from the server address, even
//! when a bootstrap IP is used to reach it.

use super::tcp::{connect, read_with_length_prefix, send_with_length_prefix};
use super::tls_config::client_config;
use super::{DnsTransport, HostResolver, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use ferrous_lookup_domain::{DomainError, UpstreamAddr};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio_rustls::TlsConnector;
use tracing::debug;

pub struct TlsTransport {
    upstream_addr: UpstreamAddr,
    server_name: ServerName<'static>,
    resolver: HostResolver,
    connector: TlsConnector,
}

impl TlsTransport {
    pub fn new(
        upstream_addr: UpstreamAddr,
        hostname: Arc<str>,
        resolver: HostResolver,
        verify_tls: bool,
    ) -> Result<Self, DomainError> {
        let server_name = ServerName::try_from(hostname.to_string()).map_err(|e| {
            DomainError::InvalidServer(format!("Invalid TLS hostname '{}': {}", hostname, e))
        })?;
        let connector = TlsConnector::from(Arc::new(client_config(verify_tls, &[])?));

        Ok(Self {
            upstream_addr,
            server_name,
            resolver,
            connector,
        })
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        let server_addr = self.resolver.resolve(&self.upstream_addr).await?;
        let tcp_stream = connect(server_addr).await?;

        let mut stream = self
            .connector
            .connect(self.server_name.clone(), tcp_stream)
            .await
            .map_err(|e| {
                DomainError::Transport(format!("TLS handshake failed with {}: {}", server_addr, e))
            })?;

        debug!(server = %server_addr, "TLS connection established");

        send_with_length_prefix(&mut stream, message_bytes).await?;
        let response_bytes = read_with_length_prefix(&mut stream).await?;

        debug!(
            server = %server_addr,
            response_len = response_bytes.len(),
            "TLS response received"
        );

        Ok(TransportResponse {
            bytes: Bytes::from(response_bytes),
            protocol_used: "TLS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}
