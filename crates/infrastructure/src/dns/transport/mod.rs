#[cfg(feature = "dns-over-h3")]
pub mod h3;
#[cfg(feature = "dns-over-https")]
pub mod https;
#[cfg(feature = "dns-over-quic")]
pub mod quic;
pub mod resolver;
pub mod tcp;
#[cfg(feature = "dns-over-rustls")]
pub mod tls;
pub mod tls_config;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use ferrous_lookup_domain::{DnsProtocol, DomainError, HttpVersion, QueryOptions, ServerDescriptor};
use std::time::Duration;

pub use resolver::HostResolver;

/// Media type of DNS wire messages carried over HTTP (RFC 8484 §6)
#[cfg(any(feature = "dns-over-https", feature = "dns-over-h3"))]
pub(crate) const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Bytes,
    pub protocol_used: &'static str,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(&self, message_bytes: &[u8]) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    #[cfg(feature = "dns-over-rustls")]
    Tls(tls::TlsTransport),
    #[cfg(feature = "dns-over-https")]
    Https(https::HttpsTransport),
    #[cfg(feature = "dns-over-quic")]
    Quic(quic::QuicTransport),
    #[cfg(feature = "dns-over-h3")]
    H3(h3::H3Transport),
}

impl Transport {
    /// Sends one query and waits for its reply. `timeout` bounds the whole
    /// exchange, connection setup included.
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
        server: &str,
    ) -> Result<TransportResponse, DomainError> {
        let exchange = async {
            match self {
                Self::Udp(t) => DnsTransport::send(t, message_bytes).await,
                Self::Tcp(t) => DnsTransport::send(t, message_bytes).await,
                #[cfg(feature = "dns-over-rustls")]
                Self::Tls(t) => DnsTransport::send(t, message_bytes).await,
                #[cfg(feature = "dns-over-https")]
                Self::Https(t) => DnsTransport::send(t, message_bytes).await,
                #[cfg(feature = "dns-over-quic")]
                Self::Quic(t) => DnsTransport::send(t, message_bytes).await,
                #[cfg(feature = "dns-over-h3")]
                Self::H3(t) => DnsTransport::send(t, message_bytes).await,
            }
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| DomainError::Timeout {
                server: server.to_string(),
            })?
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(t) => t.protocol_name(),
            Self::Tcp(t) => t.protocol_name(),
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(t) => t.protocol_name(),
            #[cfg(feature = "dns-over-https")]
            Self::Https(t) => t.protocol_name(),
            #[cfg(feature = "dns-over-quic")]
            Self::Quic(t) => t.protocol_name(),
            #[cfg(feature = "dns-over-h3")]
            Self::H3(t) => t.protocol_name(),
        }
    }
}

#[cfg(not(all(
    feature = "dns-over-rustls",
    feature = "dns-over-https",
    feature = "dns-over-quic",
    feature = "dns-over-h3"
)))]
fn not_enabled(feature: &str, server: &ServerDescriptor) -> DomainError {
    DomainError::Transport(format!(
        "{} is not supported by this build (feature '{}' disabled)",
        server, feature
    ))
}

/// Picks the transport for a server. An `https://` server is sent over
/// HTTP/3 when the options accept it.
pub fn create_transport(
    server: &ServerDescriptor,
    options: &QueryOptions,
) -> Result<Transport, DomainError> {
    let resolver = HostResolver::from_bootstrap(server.bootstrap);

    match &server.protocol {
        DnsProtocol::Udp { addr } => Ok(Transport::Udp(udp::UdpTransport::new(
            addr.clone(),
            resolver,
        ))),
        DnsProtocol::Tcp { addr } => Ok(Transport::Tcp(tcp::TcpTransport::new(
            addr.clone(),
            resolver,
        ))),

        #[cfg(feature = "dns-over-rustls")]
        DnsProtocol::Tls { addr, hostname } => Ok(Transport::Tls(tls::TlsTransport::new(
            addr.clone(),
            hostname.clone(),
            resolver,
            options.verify_tls,
        )?)),
        #[cfg(not(feature = "dns-over-rustls"))]
        DnsProtocol::Tls { .. } => Err(not_enabled("dns-over-rustls", server)),

        #[cfg(feature = "dns-over-h3")]
        DnsProtocol::Https { url, hostname } if options.accepts(HttpVersion::Http3) => Ok(
            Transport::H3(h3::H3Transport::new(url.clone(), hostname.clone(), resolver, options)?),
        ),
        #[cfg(feature = "dns-over-https")]
        DnsProtocol::Https { url, hostname } => Ok(Transport::Https(
            https::HttpsTransport::new(url.clone(), hostname.clone(), server.bootstrap, options)?,
        )),
        #[cfg(not(feature = "dns-over-https"))]
        DnsProtocol::Https { .. } => Err(not_enabled("dns-over-https", server)),

        #[cfg(feature = "dns-over-quic")]
        DnsProtocol::Quic { addr, hostname } => Ok(Transport::Quic(quic::QuicTransport::new(
            addr.clone(),
            hostname.clone(),
            resolver,
            options.verify_tls,
        )?)),
        #[cfg(not(feature = "dns-over-quic"))]
        DnsProtocol::Quic { .. } => Err(not_enabled("dns-over-quic", server)),

        #[cfg(feature = "dns-over-h3")]
        DnsProtocol::H3 { url, hostname } => Ok(Transport::H3(h3::H3Transport::new(
            url.clone(),
            hostname.clone(),
            resolver,
            options,
        )?)),
        #[cfg(not(feature = "dns-over-h3"))]
        DnsProtocol::H3 { .. } => Err(not_enabled("dns-over-h3", server)),

        DnsProtocol::DnsCrypt { .. } => Err(DomainError::Transport(format!(
            "DNSCrypt exchange with {} is not supported by this build",
            server
        ))),
    }
}
