use ferrous_lookup_domain::DomainError;
use std::net::IpAddr;
use tokio::fs;
use tracing::debug;

const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Finds the system's default resolver in resolv.conf.
pub struct ResolvConfReader {
    path: String,
}

impl ResolvConfReader {
    pub fn new() -> Self {
        Self {
            path: RESOLV_CONF_PATH.to_string(),
        }
    }

    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// First usable `nameserver` entry, as server text.
    pub async fn first_nameserver(&self) -> Result<String, DomainError> {
        let contents = fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::InvalidServer(format!(
                "no server given and {} is unreadable: {}",
                self.path, e
            ))
        })?;

        let server = parse_nameserver(&contents).ok_or_else(|| {
            DomainError::InvalidServer(format!(
                "no server given and {} lists no nameserver",
                self.path
            ))
        })?;

        debug!(path = %self.path, server = %server, "Using system resolver");
        Ok(server)
    }
}

impl Default for ResolvConfReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the first `nameserver` address. Link-local entries with a zone
/// (`fe80::1%eth0`) are skipped since they cannot be used as server text.
pub fn parse_nameserver(contents: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("nameserver"), Some(addr)) => Some(addr),
                _ => None,
            }
        })
        .find_map(|addr| addr.parse::<IpAddr>().ok())
        .map(|ip| match ip {
            IpAddr::V4(_) => ip.to_string(),
            IpAddr::V6(_) => format!("[{}]", ip),
        })
}
