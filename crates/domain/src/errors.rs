use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid record type: {0}")]
    InvalidRecordType(String),

    #[error("Invalid DNS class: {0}")]
    InvalidClass(String),

    #[error("Invalid server address: {0}")]
    InvalidServer(String),

    #[error("Invalid subnet: {0}")]
    InvalidSubnet(String),

    #[error("Invalid EDNS option: {0}")]
    InvalidLocalOption(String),

    #[error("Invalid server public key: {0}")]
    InvalidKeyEncoding(String),

    #[error("DNS message codec error: {0}")]
    Codec(String),

    #[error("Trust store unavailable: {0}")]
    TrustStoreUnavailable(String),

    #[error("Query to {server} timed out")]
    Timeout { server: String },

    #[error("Transport error: {0}")]
    Transport(String),
}
