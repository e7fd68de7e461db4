//! Domain events for the reservation ledger: the event contract, the envelope
//! that carries events onto a bus, the bus abstraction, and `execute`.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod execute;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use execute::execute;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
