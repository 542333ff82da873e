use ferrous_lookup_domain::{DomainError, UpstreamAddr};
use std::net::{IpAddr, SocketAddr};
use tracing::debug;

/// Turns server hostnames into socket addresses.
///
/// `SingleIp` answers every hostname with the bootstrap address, so the
/// system resolver is never consulted for the server itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostResolver {
    System,
    SingleIp(IpAddr),
}

impl HostResolver {
    pub fn from_bootstrap(bootstrap: Option<IpAddr>) -> Self {
        match bootstrap {
            Some(ip) => HostResolver::SingleIp(ip),
            None => HostResolver::System,
        }
    }

    pub async fn resolve(&self, addr: &UpstreamAddr) -> Result<SocketAddr, DomainError> {
        match addr {
            UpstreamAddr::Resolved(socket_addr) => Ok(*socket_addr),
            UpstreamAddr::Unresolved { hostname, port } => {
                self.resolve_host(hostname, *port).await
            }
        }
    }

    pub async fn resolve_host(&self, host: &str, port: u16) -> Result<SocketAddr, DomainError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, port));
        }

        match self {
            HostResolver::SingleIp(ip) => Ok(SocketAddr::new(*ip, port)),
            HostResolver::System => {
                let target = format!("{}:{}", host, port);
                let mut addrs = tokio::net::lookup_host(&target).await.map_err(|e| {
                    DomainError::Transport(format!("Failed to resolve {}: {}", target, e))
                })?;

                let addr = addrs.next().ok_or_else(|| {
                    DomainError::Transport(format!("No addresses found for {}", target))
                })?;
                debug!(host = %host, resolved = %addr, "Resolved server address");
                Ok(addr)
            }
        }
    }
}
