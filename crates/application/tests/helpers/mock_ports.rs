#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_lookup_application::ports::{DnsExchange, MessageCodec};
use ferrous_lookup_domain::{DomainError, QueryMessage, QueryOptions, ServerDescriptor};
use hickory_proto::op::{Message, MessageType, OpCode};
use std::sync::{Arc, Mutex};

/// Codec whose packed form is a fixed number of zero bytes.
#[derive(Clone)]
pub struct MockMessageCodec {
    packed_len: usize,
    pack_calls: Arc<Mutex<usize>>,
}

impl MockMessageCodec {
    pub fn with_len(packed_len: usize) -> Self {
        Self {
            packed_len,
            pack_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn pack_calls(&self) -> usize {
        *self.pack_calls.lock().unwrap()
    }
}

impl MessageCodec for MockMessageCodec {
    fn pack(&self, _message: &QueryMessage) -> Result<Vec<u8>, DomainError> {
        *self.pack_calls.lock().unwrap() += 1;
        Ok(vec![0u8; self.packed_len])
    }

    fn unpack(&self, _bytes: &[u8]) -> Result<Message, DomainError> {
        Err(DomainError::Codec("mock codec does not unpack".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ExchangeCall {
    pub server: ServerDescriptor,
    pub options: QueryOptions,
    pub query: QueryMessage,
}

/// Exchange that records every call and answers with an empty reply carrying
/// the query id, or with a configured error.
#[derive(Clone, Default)]
pub struct MockDnsExchange {
    calls: Arc<Mutex<Vec<ExchangeCall>>>,
    error: Arc<Mutex<Option<DomainError>>>,
}

impl MockDnsExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_error(&self, error: DomainError) {
        *self.error.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl DnsExchange for MockDnsExchange {
    async fn exchange(
        &self,
        server: &ServerDescriptor,
        options: &QueryOptions,
        query: &QueryMessage,
    ) -> Result<Message, DomainError> {
        self.calls.lock().unwrap().push(ExchangeCall {
            server: server.clone(),
            options: options.clone(),
            query: query.clone(),
        });

        if let Some(error) = self.error.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(Message::new(query.id, MessageType::Response, OpCode::Query))
    }
}
