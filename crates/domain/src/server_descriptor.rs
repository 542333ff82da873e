use crate::dns_protocol::{h3_protocol, DnsProtocol};
use crate::errors::DomainError;
use crate::stamp::DnsStamp;
use std::fmt;
use std::net::IpAddr;

const H3_SCHEME: &str = "h3";

/// Addressable server selected for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    pub protocol: DnsProtocol,
    /// Literal address the server host resolves to, bypassing DNS.
    pub bootstrap: Option<IpAddr>,
}

impl ServerDescriptor {
    pub fn new(protocol: DnsProtocol) -> Self {
        Self {
            protocol,
            bootstrap: None,
        }
    }

    /// Builds the descriptor from user-supplied server text.
    ///
    /// With both DNSCrypt credentials present the server text is replaced by
    /// an `sdns://` stamp carrying the original address, the provider name
    /// and the decoded public key. An `h3://` URI selects DNS-over-HTTP/3 and
    /// is rewritten to `https://` for the request layer. Text that does not
    /// parse as a URI is not treated as HTTP/3 and goes through the generic
    /// scheme parser instead.
    pub fn resolve(
        server_text: &str,
        provider_name: Option<&str>,
        server_pk_hex: Option<&str>,
    ) -> Result<Self, DomainError> {
        let server_text = match (provider_name, server_pk_hex) {
            (Some(provider), Some(pk_hex)) => {
                let public_key = decode_public_key(pk_hex)?;
                DnsStamp::dnscrypt(server_text.trim(), provider, public_key).encode()?
            }
            _ => server_text.trim().to_string(),
        };

        if let Some(https_url) = h3_to_https(&server_text) {
            return Ok(Self::new(h3_protocol(&https_url)?));
        }

        Ok(Self::new(server_text.parse()?))
    }

    pub fn with_bootstrap(mut self, bootstrap: IpAddr) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    pub fn http3_required(&self) -> bool {
        matches!(self.protocol, DnsProtocol::H3 { .. })
    }
}

impl fmt::Display for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bootstrap {
            Some(ip) => write!(f, "{} (via {})", self.protocol, ip),
            None => write!(f, "{}", self.protocol),
        }
    }
}

/// Strips colons and hex-decodes a DNSCrypt public key (`AB:CD:...`).
pub fn decode_public_key(pk_hex: &str) -> Result<Vec<u8>, DomainError> {
    hex::decode(pk_hex.trim().replace(':', ""))
        .map_err(|e| DomainError::InvalidKeyEncoding(format!("'{}': {}", pk_hex, e)))
}

/// Returns the `https://` form of an `h3://` URI, or `None` when the text is
/// not a parseable URI with the `h3` scheme.
fn h3_to_https(server_text: &str) -> Option<String> {
    let uri: http::Uri = server_text.parse().ok()?;
    if !uri
        .scheme_str()
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(H3_SCHEME))
    {
        return None;
    }

    let mut parts = uri.into_parts();
    parts.scheme = Some(http::uri::Scheme::HTTPS);
    http::Uri::from_parts(parts).ok().map(|uri| uri.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h3_to_https_keeps_path_and_query() {
        assert_eq!(
            h3_to_https("h3://dns.example:8443/dns-query?x=1").as_deref(),
            Some("https://dns.example:8443/dns-query?x=1")
        );
    }

    #[test]
    fn test_h3_to_https_ignores_other_schemes() {
        assert_eq!(h3_to_https("https://dns.example/dns-query"), None);
        assert_eq!(h3_to_https("1.1.1.1"), None);
        assert_eq!(h3_to_https("h3://bad host/"), None);
    }

    #[test]
    fn test_decode_public_key_strips_colons() {
        assert_eq!(decode_public_key("DE:AD:be:ef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(
            decode_public_key("xyz"),
            Err(DomainError::InvalidKeyEncoding(_))
        ));
    }
}
