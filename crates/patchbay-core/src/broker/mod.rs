//! Broker collaborator interface and the in-process reference backend.

mod memory;
mod traits;

pub use memory::MemoryBroker;
pub use traits::{Broker, BrokerConnection, MessageHandler, Subscription};
