use async_trait::async_trait;
use ferrous_lookup_domain::{DomainError, QueryMessage, QueryOptions, ServerDescriptor};
use hickory_proto::op::Message;

#[async_trait]
pub trait DnsExchange: Send + Sync {
    /// Sends `query` to `server` and returns the parsed reply. One attempt,
    /// bounded by `options.timeout`.
    async fn exchange(
        &self,
        server: &ServerDescriptor,
        options: &QueryOptions,
        query: &QueryMessage,
    ) -> Result<Message, DomainError>;
}
