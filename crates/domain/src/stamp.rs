//! DNSCrypt server stamps
//!
//! A stamp packs everything needed to reach a DNSCrypt resolver into one URI:
//! ```text
//! sdns://base64url( 0x01 | props (u64 LE) | LP(addr) | LP(pk) | LP(provider name) )
//! ```
//! where `LP(x)` is a one-byte length followed by `x`, and base64url carries
//! no padding.

use crate::dns_protocol::DEFAULT_DNSCRYPT_PORT;
use crate::errors::DomainError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::fmt;
use std::str::FromStr;

pub const STAMP_SCHEME: &str = "sdns://";

/// Protocol identifier of DNSCrypt stamps.
pub const PROTO_DNSCRYPT: u8 = 0x01;

pub const PROP_DNSSEC: u64 = 1;
pub const PROP_NO_LOG: u64 = 1 << 1;
pub const PROP_NO_FILTER: u64 = 1 << 2;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsStamp {
    pub props: u64,
    /// Server address text as supplied (`IP` or `IP:port`).
    pub server_addr: String,
    pub public_key: Vec<u8>,
    pub provider_name: String,
}

impl DnsStamp {
    pub fn dnscrypt(server_addr: &str, provider_name: &str, public_key: Vec<u8>) -> Self {
        Self {
            props: 0,
            server_addr: server_addr.to_string(),
            public_key,
            provider_name: provider_name.to_string(),
        }
    }

    /// The default port is left out of the encoded address, so `IP:443` and
    /// `IP` give the same stamp.
    pub fn encode(&self) -> Result<String, DomainError> {
        let server_addr = without_default_port(&self.server_addr);
        let mut bin = Vec::with_capacity(
            12 + server_addr.len() + self.public_key.len() + self.provider_name.len(),
        );
        bin.push(PROTO_DNSCRYPT);
        bin.extend_from_slice(&self.props.to_le_bytes());
        push_lp(&mut bin, server_addr.as_bytes(), "server address")?;
        push_lp(&mut bin, &self.public_key, "public key")?;
        push_lp(&mut bin, self.provider_name.as_bytes(), "provider name")?;

        Ok(format!("{}{}", STAMP_SCHEME, URL_SAFE_NO_PAD.encode(bin)))
    }

    pub fn decode(stamp: &str) -> Result<Self, DomainError> {
        let encoded = stamp.strip_prefix(STAMP_SCHEME).ok_or_else(|| {
            DomainError::InvalidServer(format!("'{}' is not an sdns:// stamp", stamp))
        })?;
        let bin = URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .map_err(|e| DomainError::InvalidServer(format!("stamp is not base64url: {}", e)))?;

        let mut reader = StampReader { bin: &bin, pos: 0 };
        let proto = reader.take(1, "protocol")?[0];
        if proto != PROTO_DNSCRYPT {
            return Err(DomainError::InvalidServer(format!(
                "unsupported stamp protocol 0x{:02x}, only DNSCrypt stamps are accepted",
                proto
            )));
        }

        let mut props = [0u8; 8];
        props.copy_from_slice(reader.take(8, "properties")?);
        let server_addr = reader.take_lp_string("server address")?;
        let public_key = reader.take_lp("public key")?.to_vec();
        let provider_name = reader.take_lp_string("provider name")?;

        if reader.pos != bin.len() {
            return Err(DomainError::InvalidServer(format!(
                "stamp has {} trailing bytes",
                bin.len() - reader.pos
            )));
        }

        Ok(Self {
            props: u64::from_le_bytes(props),
            server_addr,
            public_key,
            provider_name,
        })
    }
}

fn without_default_port(server_addr: &str) -> &str {
    let suffix = format!(":{}", DEFAULT_DNSCRYPT_PORT);
    match server_addr.strip_suffix(suffix.as_str()) {
        // A bare IPv6 address may itself end in ":443"
        Some(host) if host.ends_with(']') || !host.contains(':') => host,
        _ => server_addr,
    }
}

impl fmt::Display for DnsStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.encode().map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for DnsStamp {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

fn push_lp(bin: &mut Vec<u8>, value: &[u8], field: &str) -> Result<(), DomainError> {
    let len = u8::try_from(value.len()).map_err(|_| {
        DomainError::InvalidServer(format!(
            "stamp {} is {} bytes, at most 255 allowed",
            field,
            value.len()
        ))
    })?;
    bin.push(len);
    bin.extend_from_slice(value);
    Ok(())
}

struct StampReader<'a> {
    bin: &'a [u8],
    pos: usize,
}

impl<'a> StampReader<'a> {
    fn take(&mut self, len: usize, field: &str) -> Result<&'a [u8], DomainError> {
        let end = self.pos + len;
        if end > self.bin.len() {
            return Err(DomainError::InvalidServer(format!(
                "stamp truncated while reading {}",
                field
            )));
        }
        let slice = &self.bin[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_lp(&mut self, field: &str) -> Result<&'a [u8], DomainError> {
        let len = self.take(1, field)?[0] as usize;
        self.take(len, field)
    }

    fn take_lp_string(&mut self, field: &str) -> Result<String, DomainError> {
        let bytes = self.take_lp(field)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DomainError::InvalidServer(format!("stamp {} is not UTF-8", field)))
    }
}
