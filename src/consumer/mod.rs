//! Consumer handles.
//!
//! # Data Flow
//! ```text
//! ConsumerConfig
//!     → ConsumerFactory::connect (handle.rs)
//!     → Consumer handle, shared as Arc by the registry
//!     → receive(handler): (topic, key, &Message) per message
//!     → close(): release broker resources
//! ```
//!
//! `memory.rs` provides an in-process broker implementing both traits.

pub mod handle;
pub mod memory;
pub mod message;

pub use handle::{Consumer, ConsumerError, ConsumerFactory};
pub use memory::{MemoryBroker, MemoryConsumer};
pub use message::{HandlerError, Message};
