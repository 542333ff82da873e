//! Ferrous Lookup Domain Layer
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod dns_record;
pub mod dns_request;
pub mod edns;
pub mod errors;
pub mod query_options;
pub mod server_descriptor;
pub mod stamp;

pub use config::{CliOverrides, Config, ConfigError, LoggingConfig, LookupConfig};
pub use dns_protocol::{DnsProtocol, UpstreamAddr};
pub use dns_query::{QueryMessage, Question};
pub use dns_record::{DnsClass, RecordType};
pub use dns_request::{DnsCryptCredentials, LookupRequest};
pub use edns::{ClientSubnet, EdnsOption, OptRecord};
pub use errors::DomainError;
pub use query_options::{HttpVersion, LookupOptions, QueryOptions};
pub use server_descriptor::ServerDescriptor;
pub use stamp::DnsStamp;
