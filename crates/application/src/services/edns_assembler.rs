use crate::ports::MessageCodec;
use ferrous_lookup_domain::{DomainError, EdnsOption, LookupOptions, QueryMessage};
use std::sync::Arc;
use tracing::debug;

/// Builds the OPT pseudo-record of an outgoing query.
///
/// Options are appended in a fixed order: client subnet, local option,
/// padding. Padding goes last because its size depends on the packed length
/// of everything before it.
pub struct EdnsAssembler {
    codec: Arc<dyn MessageCodec>,
}

impl EdnsAssembler {
    pub fn new(codec: Arc<dyn MessageCodec>) -> Self {
        Self { codec }
    }

    pub fn assemble(
        &self,
        message: &mut QueryMessage,
        options: &LookupOptions,
    ) -> Result<(), DomainError> {
        let opt = message.ensure_opt(options.dnssec_ok);

        if let Some(cidr) = &options.subnet {
            opt.add_subnet(cidr)?;
        }

        if let Some(spec) = &options.local_option {
            opt.push(EdnsOption::local_from_spec(spec)?);
        }

        if options.padding {
            self.add_padding(message)?;
        }

        Ok(())
    }

    /// Appends a padding option sized from the current packed length and
    /// returns the number of padding bytes.
    pub fn add_padding(&self, message: &mut QueryMessage) -> Result<usize, DomainError> {
        let dnssec_ok = message.dnssec_ok();
        message.ensure_opt(dnssec_ok);

        let message_len = self.codec.pack(message)?.len();
        let option = EdnsOption::padding_for(message_len);
        let pad_len = option.payload().len();

        debug!(message_len, pad_len, "Adding EDNS padding");
        message.ensure_opt(dnssec_ok).push(option);
        Ok(pad_len)
    }
}
