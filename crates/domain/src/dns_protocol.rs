use crate::errors::DomainError;
use crate::stamp::{DnsStamp, STAMP_SCHEME};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_PLAIN_PORT: u16 = 53;
pub const DEFAULT_TLS_PORT: u16 = 853;
pub const DEFAULT_QUIC_PORT: u16 = 853;
pub const DEFAULT_HTTPS_PORT: u16 = 443;
pub const DEFAULT_DNSCRYPT_PORT: u16 = 443;

/// Represents a server address that may or may not be resolved to an IP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl UpstreamAddr {
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            UpstreamAddr::Resolved(addr) => Some(*addr),
            UpstreamAddr::Unresolved { .. } => None,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            UpstreamAddr::Resolved(addr) => addr.port(),
            UpstreamAddr::Unresolved { port, .. } => *port,
        }
    }

    /// Host part as text: the hostname, or the IP for resolved addresses.
    pub fn host(&self) -> String {
        match self {
            UpstreamAddr::Resolved(addr) => addr.ip().to_string(),
            UpstreamAddr::Unresolved { hostname, .. } => hostname.to_string(),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, UpstreamAddr::Unresolved { .. })
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => write!(f, "{}", addr),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

/// Transport selected by the server text. One variant per scheme; dispatch
/// is a single `match` over this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DnsProtocol {
    Udp {
        addr: UpstreamAddr,
    },
    Tcp {
        addr: UpstreamAddr,
    },
    Tls {
        addr: UpstreamAddr,
        hostname: Arc<str>,
    },
    Https {
        url: Arc<str>,
        hostname: Arc<str>,
    },
    Quic {
        addr: UpstreamAddr,
        hostname: Arc<str>,
    },
    /// DNS-over-HTTP/3. `url` is already rewritten to `https://`.
    H3 {
        url: Arc<str>,
        hostname: Arc<str>,
    },
    DnsCrypt {
        stamp: Arc<str>,
        addr: UpstreamAddr,
        provider_name: Arc<str>,
        public_key: Vec<u8>,
    },
}

impl DnsProtocol {
    pub fn hostname(&self) -> Option<&str> {
        match self {
            DnsProtocol::Tls { hostname, .. }
            | DnsProtocol::Https { hostname, .. }
            | DnsProtocol::Quic { hostname, .. }
            | DnsProtocol::H3 { hostname, .. } => Some(hostname),
            DnsProtocol::DnsCrypt { provider_name, .. } => Some(provider_name),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            DnsProtocol::Https { url, .. } | DnsProtocol::H3 { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn addr(&self) -> Option<&UpstreamAddr> {
        match self {
            DnsProtocol::Udp { addr }
            | DnsProtocol::Tcp { addr }
            | DnsProtocol::Tls { addr, .. }
            | DnsProtocol::Quic { addr, .. }
            | DnsProtocol::DnsCrypt { addr, .. } => Some(addr),
            DnsProtocol::Https { .. } | DnsProtocol::H3 { .. } => None,
        }
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.addr().and_then(UpstreamAddr::socket_addr)
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            DnsProtocol::Udp { .. } => "UDP",
            DnsProtocol::Tcp { .. } => "TCP",
            DnsProtocol::Tls { .. } => "TLS",
            DnsProtocol::Https { .. } => "HTTPS",
            DnsProtocol::Quic { .. } => "QUIC",
            DnsProtocol::H3 { .. } => "H3",
            DnsProtocol::DnsCrypt { .. } => "DNSCrypt",
        }
    }

    fn from_stamp(s: &str) -> Result<Self, DomainError> {
        let stamp = DnsStamp::decode(s)?;
        let addr = parse_upstream_addr(&stamp.server_addr, DEFAULT_DNSCRYPT_PORT)?;
        Ok(DnsProtocol::DnsCrypt {
            stamp: s.into(),
            addr,
            provider_name: stamp.provider_name.into(),
            public_key: stamp.public_key,
        })
    }
}

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        let port_str = rest.strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}

fn is_hostname(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 253
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
}

fn parse_upstream_addr(addr_str: &str, default_port: u16) -> Result<UpstreamAddr, DomainError> {
    let addr_str = addr_str.trim_end_matches('/');
    if let Ok(addr) = addr_str.parse::<SocketAddr>() {
        return Ok(UpstreamAddr::Resolved(addr));
    }
    if let Ok(ip) = addr_str.parse::<IpAddr>() {
        return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, default_port)));
    }
    if let Some(ip) = addr_str
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .and_then(|s| s.parse::<IpAddr>().ok())
    {
        return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, default_port)));
    }
    if let Some((host, port)) = parse_host_port(addr_str) {
        if is_hostname(host) {
            return Ok(UpstreamAddr::Unresolved {
                hostname: host.into(),
                port,
            });
        }
    }
    if is_hostname(addr_str) {
        return Ok(UpstreamAddr::Unresolved {
            hostname: addr_str.into(),
            port: default_port,
        });
    }
    Err(DomainError::InvalidServer(format!(
        "Invalid address '{}'",
        addr_str
    )))
}

fn parse_url(s: &str) -> Result<(Arc<str>, Arc<str>), DomainError> {
    let uri: http::Uri = s
        .parse()
        .map_err(|e| DomainError::InvalidServer(format!("Invalid URL '{}': {}", s, e)))?;
    let hostname = uri
        .host()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .filter(|h| !h.is_empty())
        .ok_or_else(|| DomainError::InvalidServer(format!("URL '{}' has no host", s)))?;
    Ok((s.into(), hostname.into()))
}

impl FromStr for DnsProtocol {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(addr_str) = s.strip_prefix("udp://") {
            let addr = parse_upstream_addr(addr_str, DEFAULT_PLAIN_PORT)?;
            return Ok(DnsProtocol::Udp { addr });
        }
        if let Some(addr_str) = s.strip_prefix("tcp://") {
            let addr = parse_upstream_addr(addr_str, DEFAULT_PLAIN_PORT)?;
            return Ok(DnsProtocol::Tcp { addr });
        }
        if let Some(rest) = s.strip_prefix("tls://") {
            let addr = parse_upstream_addr(rest, DEFAULT_TLS_PORT)?;
            let hostname: Arc<str> = addr.host().into();
            return Ok(DnsProtocol::Tls { addr, hostname });
        }
        if let Some(rest) = s
            .strip_prefix("quic://")
            .or_else(|| s.strip_prefix("doq://"))
        {
            let addr = parse_upstream_addr(rest, DEFAULT_QUIC_PORT)?;
            let hostname: Arc<str> = addr.host().into();
            return Ok(DnsProtocol::Quic { addr, hostname });
        }
        if s.starts_with("https://") {
            let (url, hostname) = parse_url(s)?;
            return Ok(DnsProtocol::Https { url, hostname });
        }
        if s.starts_with(STAMP_SCHEME) {
            return Self::from_stamp(s);
        }
        if s.contains("://") {
            return Err(DomainError::InvalidServer(format!(
                "Unsupported scheme in '{}'. Expected: IP[:PORT], udp://, tcp://, tls://, https://, h3://, quic://, sdns://",
                s
            )));
        }
        let addr = parse_upstream_addr(s, DEFAULT_PLAIN_PORT)?;
        Ok(DnsProtocol::Udp { addr })
    }
}

impl fmt::Display for DnsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsProtocol::Udp { addr } => write!(f, "udp://{}", addr),
            DnsProtocol::Tcp { addr } => write!(f, "tcp://{}", addr),
            DnsProtocol::Tls { addr, hostname } => {
                write!(f, "tls://{}:{}", hostname, addr.port())
            }
            DnsProtocol::Https { url, .. } => write!(f, "{}", url),
            DnsProtocol::H3 { url, .. } => write!(f, "{}", url.replacen("https://", "h3://", 1)),
            DnsProtocol::Quic { addr, hostname } => {
                write!(f, "quic://{}:{}", hostname, addr.port())
            }
            DnsProtocol::DnsCrypt { stamp, .. } => write!(f, "{}", stamp),
        }
    }
}

pub(crate) fn h3_protocol(https_url: &str) -> Result<DnsProtocol, DomainError> {
    let (url, hostname) = parse_url(https_url)?;
    Ok(DnsProtocol::H3 { url, hostname })
}
