use crate::ports::{DnsExchange, MessageCodec};
use crate::services::EdnsAssembler;
use ferrous_lookup_domain::{DomainError, LookupRequest, QueryMessage, Question, ServerDescriptor};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub message: Message,
    pub query: QueryMessage,
    pub server: ServerDescriptor,
    pub elapsed: Duration,
}

/// Resolves one question against one server.
///
/// Every input is validated before the exchange is attempted, so malformed
/// domains, servers, keys or EDNS options never cause network traffic.
pub struct LookupUseCase {
    exchange: Arc<dyn DnsExchange>,
    assembler: EdnsAssembler,
}

impl LookupUseCase {
    pub fn new(codec: Arc<dyn MessageCodec>, exchange: Arc<dyn DnsExchange>) -> Self {
        Self {
            exchange,
            assembler: EdnsAssembler::new(codec),
        }
    }

    pub async fn execute(&self, request: &LookupRequest) -> Result<LookupOutcome, DomainError> {
        let question = Question::for_lookup(&request.domain, request.record_type, request.class)?;

        let (provider_name, public_key_hex) = match &request.dnscrypt {
            Some(creds) => (Some(&*creds.provider_name), Some(&*creds.public_key_hex)),
            None => (None, None),
        };
        let mut server = ServerDescriptor::resolve(&request.server, provider_name, public_key_hex)?;
        if let Some(bootstrap) = request.bootstrap {
            server = server.with_bootstrap(bootstrap);
        }

        let mut query = QueryMessage::new(fastrand::u16(..), question);
        self.assembler.assemble(&mut query, &request.options)?;

        if !request.options.query.verify_tls {
            warn!("TLS certificate verification is disabled");
        }
        debug!(
            server = %server,
            protocol = server.protocol.protocol_name(),
            domain = %query.question.name,
            record_type = %query.question.record_type,
            id = query.id,
            "Sending query"
        );

        let start = Instant::now();
        let message = self
            .exchange
            .exchange(&server, &request.options.query, &query)
            .await?;
        let elapsed = start.elapsed();

        debug!(
            answers = message.answers().len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Received reply"
        );

        Ok(LookupOutcome {
            message,
            query,
            server,
            elapsed,
        })
    }
}
