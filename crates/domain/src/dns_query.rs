use super::edns::OptRecord;
use super::errors::DomainError;
use super::{DnsClass, RecordType};
use std::net::IpAddr;
use std::sync::Arc;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 253;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Fully qualified name, always ending with a dot.
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub class: DnsClass,
}

impl Question {
    pub fn new(
        name: &str,
        record_type: RecordType,
        class: DnsClass,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            name: fqdn(name)?.into(),
            record_type,
            class,
        })
    }

    /// Builds the question for a lookup. A literal IP address queried without
    /// an explicit type becomes a PTR query on its reverse name.
    pub fn for_lookup(
        domain: &str,
        record_type: Option<RecordType>,
        class: DnsClass,
    ) -> Result<Self, DomainError> {
        match (record_type, domain.parse::<IpAddr>()) {
            (None, Ok(ip)) => Self::new(&reverse_name(ip), RecordType::PTR, class),
            (record_type, _) => Self::new(domain, record_type.unwrap_or(RecordType::A), class),
        }
    }

    /// Name labels without the root label.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.name.split('.').filter(|label| !label.is_empty())
    }
}

/// Outgoing query: one question and at most one OPT pseudo-record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMessage {
    pub id: u16,
    pub recursion_desired: bool,
    pub question: Question,
    opt: Option<OptRecord>,
}

impl QueryMessage {
    pub fn new(id: u16, question: Question) -> Self {
        Self {
            id,
            recursion_desired: true,
            question,
            opt: None,
        }
    }

    pub fn opt(&self) -> Option<&OptRecord> {
        self.opt.as_ref()
    }

    pub fn opt_mut(&mut self) -> Option<&mut OptRecord> {
        self.opt.as_mut()
    }

    /// Returns the OPT record, creating it with the default payload size and
    /// the given DO bit when absent. An existing record is returned untouched.
    pub fn ensure_opt(&mut self, dnssec_ok: bool) -> &mut OptRecord {
        self.opt.get_or_insert_with(|| OptRecord::new(dnssec_ok))
    }

    pub fn dnssec_ok(&self) -> bool {
        self.opt.as_ref().is_some_and(|opt| opt.dnssec_ok)
    }
}

/// Normalizes `name` to a fully qualified name and validates label lengths.
pub fn fqdn(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDomainName(
            "domain name cannot be empty".to_string(),
        ));
    }
    if trimmed == "." {
        return Ok(".".to_string());
    }

    let bare = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if bare.len() > MAX_NAME_LEN {
        return Err(DomainError::InvalidDomainName(format!(
            "'{}' exceeds {} characters",
            name, MAX_NAME_LEN
        )));
    }
    for label in bare.split('.') {
        if label.is_empty() {
            return Err(DomainError::InvalidDomainName(format!(
                "'{}' contains an empty label",
                name
            )));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "label '{}' exceeds {} characters",
                label, MAX_LABEL_LEN
            )));
        }
    }

    Ok(format!("{}.", bare))
}

/// Reverse-mapping name for `ip` (`in-addr.arpa.` / `ip6.arpa.`).
pub fn reverse_name(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{}.{}.{}.{}.in-addr.arpa.", d, c, b, a)
        }
        IpAddr::V6(v6) => {
            let mut name = String::with_capacity(72);
            for byte in v6.octets().iter().rev() {
                name.push_str(&format!("{:x}.{:x}.", byte & 0x0f, byte >> 4));
            }
            name.push_str("ip6.arpa.");
            name
        }
    }
}
