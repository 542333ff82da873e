pub mod codec;
pub mod exchange;
pub mod transport;

pub use codec::WireCodec;
pub use exchange::TransportExchange;
pub use transport::{create_transport, HostResolver, Transport};
