use ferrous_lookup_domain::{DomainError, QueryMessage};
use hickory_proto::op::Message;

/// Wire-format conversion of DNS messages.
///
/// Both directions fail with [`DomainError::Codec`].
pub trait MessageCodec: Send + Sync {
    fn pack(&self, message: &QueryMessage) -> Result<Vec<u8>, DomainError>;

    fn unpack(&self, bytes: &[u8]) -> Result<Message, DomainError>;
}
