use ferrous_lookup_application::ports::MessageCodec;
use ferrous_lookup_application::use_cases::LookupUseCase;
use ferrous_lookup_infrastructure::dns::{TransportExchange, WireCodec};
use std::sync::Arc;

pub struct LookupServices {
    pub lookup: LookupUseCase,
}

impl LookupServices {
    pub fn new() -> Self {
        let codec: Arc<dyn MessageCodec> = Arc::new(WireCodec::new());
        let exchange = Arc::new(TransportExchange::new(codec.clone()));

        Self {
            lookup: LookupUseCase::new(codec, exchange),
        }
    }
}
