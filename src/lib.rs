//! Lazily-built, name-keyed registry of message-queue consumers.
//!
//! ```text
//!   caller ──get_or_create("default")──▶ ConsumerRegistry
//!                                          │ hit: cached Arc<Consumer>
//!                                          │ miss:
//!                                          ├─▶ ConfigGate ──load once──▶ ConfigSource (TOML)
//!                                          └─▶ ConsumerFactory::connect(ConsumerConfig)
//! ```

pub mod config;
pub mod consumer;
pub mod observability;
pub mod registry;

pub use config::{ConfigSource, ConsumerConfig, FileConfigSource, RegistryConfig};
pub use consumer::{Consumer, ConsumerError, ConsumerFactory, MemoryBroker, Message};
pub use registry::{ConsumerRegistry, RegistryError, DEFAULT_CONSUMER};
