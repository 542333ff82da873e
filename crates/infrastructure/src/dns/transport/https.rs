//! DNS-over-HTTPS (RFC 8484)
//!
//! Sends DNS queries as HTTP POST requests with `application/dns-message` content type.
//! The request body is the raw DNS wire format message, and the response body
//! contains the raw DNS wire format response.
//!
//! Wire format (HTTP):
//! ```text
//! POST /dns-query HTTP/2
//! Content-Type: application/dns-message
//! Accept: application/dns-message
//!
//! <raw DNS message bytes>
//! ```

use super::{DnsTransport, TransportResponse, DNS_MESSAGE_CONTENT_TYPE};
use async_trait::async_trait;
use ferrous_lookup_domain::{DomainError, HttpVersion, QueryOptions};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_HTTPS_PORT: u16 = 443;

/// DNS-over-HTTPS transport (RFC 8484)
pub struct HttpsTransport {
    url: Arc<str>,
    client: reqwest::Client,
}

impl HttpsTransport {
    /// With `bootstrap` set, the URL host is pinned to that address and never
    /// looked up.
    pub fn new(
        url: Arc<str>,
        hostname: Arc<str>,
        bootstrap: Option<IpAddr>,
        options: &QueryOptions,
    ) -> Result<Self, DomainError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .danger_accept_invalid_certs(!options.verify_tls);

        if options.only(HttpVersion::Http2) {
            builder = builder.http2_prior_knowledge();
        } else if options.only(HttpVersion::Http11) {
            builder = builder.http1_only();
        }

        if let Some(ip) = bootstrap {
            let port = url_port(&url).unwrap_or(DEFAULT_HTTPS_PORT);
            builder = builder.resolve(&hostname, SocketAddr::new(ip, port));
        }

        let client = builder.build().map_err(|e| {
            DomainError::TrustStoreUnavailable(format!("Failed to build HTTPS client: {}", e))
        })?;

        Ok(Self { url, client })
    }
}

fn url_port(url: &str) -> Option<u16> {
    url.parse::<http::Uri>().ok()?.port_u16()
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError> {
        debug!(url = %self.url, message_len = message_bytes.len(), "Sending DoH query");

        let response = self
            .client
            .post(&*self.url)
            .header(http::header::CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
            .header(http::header::ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            .body(message_bytes.to_vec())
            .send()
            .await
            .map_err(|e| {
                DomainError::Transport(format!("DoH request to {} failed: {}", self.url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Transport(format!(
                "DoH server {} returned HTTP {}: {}",
                self.url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let response_bytes = response.bytes().await.map_err(|e| {
            DomainError::Transport(format!(
                "Failed to read DoH response from {}: {}",
                self.url, e
            ))
        })?;

        debug!(url = %self.url, response_len = response_bytes.len(), "DoH response received");

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "HTTPS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}
