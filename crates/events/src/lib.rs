//! Event mechanics: the `Event` contract and a pub/sub bus.
//!
//! Domain event enums live with their aggregates; this crate only knows how
//! events are shaped and how they travel to the presentation layer.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
