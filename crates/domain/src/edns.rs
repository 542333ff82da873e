//! EDNS(0) pseudo-record model (RFC 6891)
//!
//! The OPT record is kept as a typed value on the query message instead of a
//! raw additional record, so option order and the single-OPT invariant are
//! explicit. Wire encoding lives in the infrastructure codec.

use crate::errors::DomainError;
use ipnetwork::IpNetwork;
use std::net::IpAddr;

/// UDP payload size advertised by a freshly created OPT record.
pub const UDP_BUFFER_SIZE: u16 = 4096;

/// Query padding block size (RFC 8467 §4.1, block-length padding).
pub const PADDING_BLOCK_SIZE: usize = 128;

/// EDNS Client Subnet option code (RFC 7871).
pub const EDNS_CODE_SUBNET: u16 = 8;

/// EDNS Padding option code (RFC 7830).
pub const EDNS_CODE_PADDING: u16 = 12;

/// Address family numbers used by the client-subnet option.
pub const FAMILY_IPV4: u16 = 1;
pub const FAMILY_IPV6: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSubnet {
    pub family: u16,
    pub source_netmask: u8,
    /// Always zero on queries: the client does not constrain the answer scope.
    pub scope_netmask: u8,
    /// Network address (host bits cleared).
    pub address: IpAddr,
}

impl ClientSubnet {
    pub fn from_cidr(cidr: &str) -> Result<Self, DomainError> {
        let cidr = cidr.trim();
        if !cidr.contains('/') {
            return Err(DomainError::InvalidSubnet(format!(
                "'{}' must include a prefix length (e.g. 192.0.2.0/24)",
                cidr
            )));
        }

        let network: IpNetwork = cidr
            .parse()
            .map_err(|e| DomainError::InvalidSubnet(format!("'{}': {}", cidr, e)))?;

        let family = match network {
            IpNetwork::V4(_) => FAMILY_IPV4,
            IpNetwork::V6(_) => FAMILY_IPV6,
        };

        Ok(Self {
            family,
            source_netmask: network.prefix(),
            scope_netmask: 0,
            address: network.network(),
        })
    }

    /// Address bytes as carried on the wire: the prefix truncated to whole
    /// octets (RFC 7871 §6).
    pub fn address_prefix(&self) -> Vec<u8> {
        let octets = match self.address {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        };
        let len = (self.source_netmask as usize).div_ceil(8).min(octets.len());
        octets[..len].to_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdnsOption {
    Subnet(ClientSubnet),
    Padding(Vec<u8>),
    Local { code: u16, data: Vec<u8> },
}

impl EdnsOption {
    pub fn code(&self) -> u16 {
        match self {
            EdnsOption::Subnet(_) => EDNS_CODE_SUBNET,
            EdnsOption::Padding(_) => EDNS_CODE_PADDING,
            EdnsOption::Local { code, .. } => *code,
        }
    }

    /// Option data in wire form, without the code/length header.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            EdnsOption::Subnet(subnet) => {
                let prefix = subnet.address_prefix();
                let mut data = Vec::with_capacity(4 + prefix.len());
                data.extend_from_slice(&subnet.family.to_be_bytes());
                data.push(subnet.source_netmask);
                data.push(subnet.scope_netmask);
                data.extend_from_slice(&prefix);
                data
            }
            EdnsOption::Padding(bytes) => bytes.clone(),
            EdnsOption::Local { data, .. } => data.clone(),
        }
    }

    /// Builds a local option from a decimal code and an optional hex payload.
    /// Colons inside the payload are ignored (`de:ad:be:ef`).
    pub fn local(code: &str, hex_payload: Option<&str>) -> Result<Self, DomainError> {
        let code = code.trim().parse::<u16>().map_err(|e| {
            DomainError::InvalidLocalOption(format!("code '{}': {}", code, e))
        })?;

        let data = match hex_payload {
            Some(payload) => hex::decode(payload.replace(':', "")).map_err(|e| {
                DomainError::InvalidLocalOption(format!("payload '{}': {}", payload, e))
            })?,
            None => Vec::new(),
        };

        Ok(EdnsOption::Local { code, data })
    }

    /// Parses the `code[:hex]` form, e.g. `65074:deadbeef`.
    pub fn local_from_spec(spec: &str) -> Result<Self, DomainError> {
        match spec.split_once(':') {
            Some((code, payload)) => Self::local(code, Some(payload)),
            None => Self::local(spec, None),
        }
    }

    /// Zero-filled padding sized for a message of `message_len` bytes.
    pub fn padding_for(message_len: usize) -> Self {
        EdnsOption::Padding(vec![0u8; padding_len(message_len)])
    }
}

/// Number of padding bytes that bring `message_len` up to the next multiple
/// of [`PADDING_BLOCK_SIZE`], truncated so the result never exceeds
/// [`UDP_BUFFER_SIZE`].
pub fn padding_len(message_len: usize) -> usize {
    let max = UDP_BUFFER_SIZE as usize;
    let padded = message_len.div_ceil(PADDING_BLOCK_SIZE) * PADDING_BLOCK_SIZE;
    if padded > max {
        max.saturating_sub(message_len)
    } else {
        padded - message_len
    }
}

/// The OPT pseudo-record attached to a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptRecord {
    pub udp_payload_size: u16,
    pub dnssec_ok: bool,
    options: Vec<EdnsOption>,
}

impl OptRecord {
    pub fn new(dnssec_ok: bool) -> Self {
        Self {
            udp_payload_size: UDP_BUFFER_SIZE,
            dnssec_ok,
            options: Vec::new(),
        }
    }

    /// Options in the order they were added.
    pub fn options(&self) -> &[EdnsOption] {
        &self.options
    }

    pub fn push(&mut self, option: EdnsOption) {
        self.options.push(option);
    }

    pub fn get(&self, code: u16) -> Option<&EdnsOption> {
        self.options.iter().find(|o| o.code() == code)
    }

    pub fn add_subnet(&mut self, cidr: &str) -> Result<(), DomainError> {
        self.options
            .push(EdnsOption::Subnet(ClientSubnet::from_cidr(cidr)?));
        Ok(())
    }

    pub fn add_local(&mut self, code: &str, hex_payload: Option<&str>) -> Result<(), DomainError> {
        self.options.push(EdnsOption::local(code, hex_payload)?);
        Ok(())
    }

    /// Length of the RDATA (all options with their 4-byte headers).
    pub fn rdata_len(&self) -> usize {
        self.options.iter().map(|o| 4 + o.payload().len()).sum()
    }
}
