//! DNS-over-HTTP/3 transport
//!
//! Each query opens its own QUIC connection, sends a single GET request with
//! the message in the `dns` parameter (RFC 8484 §4.1) and closes everything
//! when done, whether the request succeeded or not.

use super::tls_config::{quic_client_config, ALPN_H3};
use super::udp::bind_addr_for;
use super::{DnsTransport, HostResolver, TransportResponse, DNS_MESSAGE_CONTENT_TYPE};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::{Buf, Bytes, BytesMut};
use ferrous_lookup_domain::{DomainError, QueryOptions};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

type H3SendRequest = h3::client::SendRequest<h3_quinn::OpenStreams, Bytes>;

const H3_NO_ERROR: u32 = 0x100;
const DEFAULT_HTTPS_PORT: u16 = 443;

pub struct H3Transport {
    url: Arc<str>,
    hostname: Arc<str>,
    port: u16,
    resolver: HostResolver,
    client_config: quinn::ClientConfig,
}

impl H3Transport {
    pub fn new(
        url: Arc<str>,
        hostname: Arc<str>,
        resolver: HostResolver,
        options: &QueryOptions,
    ) -> Result<Self, DomainError> {
        let uri: http::Uri = url
            .parse()
            .map_err(|e| DomainError::InvalidServer(format!("Invalid URL '{}': {}", url, e)))?;
        let port = uri.port_u16().unwrap_or(DEFAULT_HTTPS_PORT);

        Ok(Self {
            url,
            hostname,
            port,
            resolver,
            client_config: quic_client_config(options.verify_tls, &[ALPN_H3])?,
        })
    }
}

/// Appends the base64url-encoded message as the `dns` query parameter.
pub fn build_get_url(url: &str, message_bytes: &[u8]) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}dns={}",
        url,
        separator,
        URL_SAFE_NO_PAD.encode(message_bytes)
    )
}

/// Releases the connection, the endpoint and the driver task on drop.
struct H3Guard {
    endpoint: quinn::Endpoint,
    connection: quinn::Connection,
    driver: Option<JoinHandle<()>>,
}

impl Drop for H3Guard {
    fn drop(&mut self) {
        let code = quinn::VarInt::from_u32(H3_NO_ERROR);
        self.connection.close(code, b"");
        self.endpoint.close(code, b"");
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

impl H3Transport {
    async fn connect(&self) -> Result<H3Guard, DomainError> {
        let server_addr = self.resolver.resolve_host(&self.hostname, self.port).await?;

        let mut endpoint = quinn::Endpoint::client(bind_addr_for(&server_addr)).map_err(|e| {
            DomainError::Transport(format!("Failed to create QUIC endpoint: {}", e))
        })?;
        endpoint.set_default_client_config(self.client_config.clone());

        let connecting = endpoint.connect(server_addr, &self.hostname).map_err(|e| {
            DomainError::Transport(format!(
                "Failed to initiate H3 connection to {}: {}",
                server_addr, e
            ))
        })?;

        let connection = connecting.await.map_err(|e| {
            DomainError::Transport(format!(
                "H3 connection to {}({}) failed: {}",
                self.hostname, server_addr, e
            ))
        })?;

        debug!(server = %server_addr, hostname = %self.hostname, "H3 connection established");

        Ok(H3Guard {
            endpoint,
            connection,
            driver: None,
        })
    }

    async fn request(
        &self,
        guard: &mut H3Guard,
        message_bytes: &[u8],
    ) -> Result<Bytes, DomainError> {
        let h3_conn = h3_quinn::Connection::new(guard.connection.clone());
        let (mut driver, mut send_request): (_, H3SendRequest) =
            h3::client::new(h3_conn).await.map_err(|e| {
                DomainError::Transport(format!(
                    "Failed to create H3 client for {}: {}",
                    self.url, e
                ))
            })?;

        guard.driver = Some(tokio::spawn(async move {
            let _ = std::future::poll_fn(|cx| driver.poll_close(cx)).await;
        }));

        let request = http::Request::builder()
            .method(http::Method::GET)
            .uri(build_get_url(&self.url, message_bytes))
            .header(http::header::ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            .body(())
            .map_err(|e| DomainError::Transport(format!("Failed to build H3 request: {}", e)))?;

        let mut stream = send_request.send_request(request).await.map_err(|e| {
            DomainError::Transport(format!("Failed to send H3 request to {}: {}", self.url, e))
        })?;

        stream.finish().await.map_err(|e| {
            DomainError::Transport(format!("Failed to finish H3 stream to {}: {}", self.url, e))
        })?;

        let response = stream.recv_response().await.map_err(|e| {
            DomainError::Transport(format!(
                "Failed to receive H3 response from {}: {}",
                self.url, e
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Transport(format!(
                "H3 server {} returned HTTP {}",
                self.url,
                status.as_u16()
            )));
        }

        let mut body = BytesMut::new();
        while let Some(mut chunk) = stream.recv_data().await.map_err(|e| {
            DomainError::Transport(format!("Failed to read H3 body from {}: {}", self.url, e))
        })? {
            body.extend_from_slice(chunk.chunk());
            chunk.advance(chunk.remaining());
        }

        Ok(body.freeze())
    }
}

#[async_trait]
impl DnsTransport for H3Transport {
    async fn send(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        let mut guard = self.connect().await?;
        let response_bytes = self.request(&mut guard, message_bytes).await?;

        debug!(url = %self.url, response_len = response_bytes.len(), "DoH3 response received");

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "H3",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "H3"
    }
}
