use super::query_options::LookupOptions;
use super::{DnsClass, RecordType};
use std::net::IpAddr;
use std::sync::Arc;

/// DNSCrypt provider credentials supplied next to the server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsCryptCredentials {
    pub provider_name: Arc<str>,
    /// Hex-encoded, colons allowed.
    pub public_key_hex: Arc<str>,
}

/// One lookup as requested by the caller.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub domain: Arc<str>,
    /// `None` lets the lookup pick A, or PTR for literal IP addresses.
    pub record_type: Option<RecordType>,
    pub class: DnsClass,
    pub server: Arc<str>,
    pub bootstrap: Option<IpAddr>,
    pub dnscrypt: Option<DnsCryptCredentials>,
    pub options: LookupOptions,
}

impl LookupRequest {
    pub fn new(domain: impl Into<Arc<str>>, server: impl Into<Arc<str>>) -> Self {
        Self {
            domain: domain.into(),
            record_type: None,
            class: DnsClass::IN,
            server: server.into(),
            bootstrap: None,
            dnscrypt: None,
            options: LookupOptions::default(),
        }
    }

    pub fn with_record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    pub fn with_class(mut self, class: DnsClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: IpAddr) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    pub fn with_dnscrypt(mut self, provider_name: &str, public_key_hex: &str) -> Self {
        self.dnscrypt = Some(DnsCryptCredentials {
            provider_name: provider_name.into(),
            public_key_hex: public_key_hex.into(),
        });
        self
    }

    pub fn with_options(mut self, options: LookupOptions) -> Self {
        self.options = options;
        self
    }
}
