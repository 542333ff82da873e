use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpVersion {
    #[serde(rename = "HTTP/3")]
    Http3,
    #[serde(rename = "HTTP/2")]
    Http2,
    #[serde(rename = "HTTP/1.1")]
    Http11,
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpVersion::Http3 => "HTTP/3",
            HttpVersion::Http2 => "HTTP/2",
            HttpVersion::Http11 => "HTTP/1.1",
        })
    }
}

impl FromStr for HttpVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HTTP/3" | "H3" | "3" => Ok(HttpVersion::Http3),
            "HTTP/2" | "H2" | "2" => Ok(HttpVersion::Http2),
            "HTTP/1.1" | "HTTP/1" | "1.1" => Ok(HttpVersion::Http11),
            _ => Err(DomainError::InvalidServer(format!(
                "unknown HTTP version '{}'",
                s
            ))),
        }
    }
}

/// Transport settings for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub timeout: Duration,
    pub verify_tls: bool,
    /// Acceptable HTTP versions in preference order. Empty means the
    /// transport default (HTTP/2 with HTTP/1.1 fallback).
    pub http_versions: Vec<HttpVersion>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
            http_versions: Vec::new(),
        }
    }
}

impl QueryOptions {
    pub fn accepts(&self, version: HttpVersion) -> bool {
        self.http_versions.contains(&version)
    }

    /// True when the version list names exactly `version` and nothing else.
    pub fn only(&self, version: HttpVersion) -> bool {
        !self.http_versions.is_empty() && self.http_versions.iter().all(|v| *v == version)
    }
}

/// Everything that shapes the outgoing query besides the question itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupOptions {
    pub query: QueryOptions,
    pub dnssec_ok: bool,
    /// Client-subnet CIDR, e.g. `203.0.113.0/24`.
    pub subnet: Option<String>,
    /// Local EDNS option as `code[:hex]`.
    pub local_option: Option<String>,
    pub padding: bool,
}
