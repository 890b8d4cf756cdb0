//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RegistryConfig (validated, immutable)
//!     → source.rs publishes it as the current Arc snapshot
//!
//! On file change:
//!     watcher.rs detects change
//!     → source reloads through loader.rs
//!     → atomic swap of Arc<RegistryConfig>
//!     → next registry miss observes the new snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - A failed reload keeps the previous snapshot
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod source;
pub mod validation;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::{ConsumerConfig, KafkaConfig, RegistryConfig, MAX_RECEIVE_WORKERS};
pub use source::{ConfigSource, FileConfigSource, StaticConfigSource};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
