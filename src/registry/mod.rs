//! Consumer registry.
//!
//! # Data Flow
//! ```text
//! get_or_create(name)
//!     → read lock: cache hit? return Arc<Consumer>
//!     → miss: gate.rs loads the document once, resolves the section
//!     → factory.connect(config), no lock held
//!         → error: returned as is, nothing cached
//!         → ok: write lock, insert (last insert wins)
//!
//! close(name)
//!     → read lock lookup only, never constructs
//!     → consumer.close(); entry stays cached
//! ```
//!
//! # Per-name states
//! ```text
//! Absent → Constructing → Cached → Closed (still cached)
//! Absent → Constructing → failed → Absent (retryable)
//! ```

pub mod error;
pub mod gate;
pub mod store;

pub use error::RegistryError;
pub use gate::{ConfigGate, ConfigState};
pub use store::{ConsumerRegistry, DEFAULT_CONSUMER};
