use crate::edns::EdnsOption;
use crate::query_options::{HttpVersion, LookupOptions, QueryOptions};
use crate::{DnsClass, RecordType};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults for a lookup, overridable from the command line.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// Server used when none is given on the command line. `None` falls back
    /// to the system resolver.
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default)]
    pub record_type: Option<String>,

    #[serde(default = "default_class")]
    pub class: String,

    /// Query timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_true")]
    pub verify_tls: bool,

    #[serde(default)]
    pub http3: bool,

    #[serde(default)]
    pub dnssec: bool,

    #[serde(default)]
    pub padding: bool,

    #[serde(default)]
    pub subnet: Option<String>,

    /// Local EDNS option as `code[:hex]`.
    #[serde(default)]
    pub edns_option: Option<String>,

    #[serde(default)]
    pub json: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            server: None,
            record_type: None,
            class: default_class(),
            timeout: default_timeout(),
            verify_tls: true,
            http3: false,
            dnssec: false,
            padding: false,
            subnet: None,
            edns_option: None,
            json: false,
        }
    }
}

impl LookupConfig {
    pub fn parsed_record_type(&self) -> Result<Option<RecordType>, crate::DomainError> {
        self.record_type.as_deref().map(str::parse::<RecordType>).transpose()
    }

    pub fn parsed_class(&self) -> Result<DnsClass, crate::DomainError> {
        self.class.parse()
    }

    pub fn lookup_options(&self) -> LookupOptions {
        let http_versions = if self.http3 {
            vec![HttpVersion::Http3, HttpVersion::Http2, HttpVersion::Http11]
        } else {
            Vec::new()
        };

        LookupOptions {
            query: QueryOptions {
                timeout: Duration::from_secs(self.timeout),
                verify_tls: self.verify_tls,
                http_versions,
            },
            dnssec_ok: self.dnssec,
            subnet: self.subnet.clone(),
            local_option: self.edns_option.clone(),
            padding: self.padding,
        }
    }

    /// Rejects values that can be checked without touching the network.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("timeout must be at least 1 second".to_string());
        }
        self.parsed_record_type().map_err(|e| e.to_string())?;
        self.parsed_class().map_err(|e| e.to_string())?;
        if let Some(spec) = &self.edns_option {
            EdnsOption::local_from_spec(spec).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

fn default_class() -> String {
    "IN".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}
