//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry + consumers produce:
//!     → tracing events (construction, close, config load)
//!     → metrics.rs (lookup, construction and handler counters)
//!
//! Consumers:
//!     → logging.rs installs the fmt subscriber (stdout)
//!     → whatever metrics recorder the host process installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (`consumer = %name`) rather than formatted strings
//! - The registry does not log the errors it returns to callers

pub mod logging;
pub mod metrics;
