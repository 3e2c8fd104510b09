//! Events and the pub/sub transport used to notify collaborators.
//!
//! The ledger engine never sends email or renders UI. It emits notices
//! ("entity X needs approval from ...", "entity X was decided by ...") on an
//! [`EventBus`]; external layers subscribe and act on them.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
