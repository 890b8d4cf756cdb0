//! Registry error types.

use thiserror::Error;

use crate::consumer::ConsumerError;

/// Errors returned by registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The document failed to load or defines no consumer sections.
    #[error("kafka consumer config missing in {location}: {reason}")]
    ConfigMissing { location: String, reason: String },

    /// The document loaded but has no section for this name.
    #[error("kafka consumer `{0}` is not configured")]
    NotConfigured(String),

    /// The factory failed to build the consumer. Never cached.
    #[error(transparent)]
    Construction(ConsumerError),

    /// The consumer's own receive loop failed.
    #[error(transparent)]
    Receive(ConsumerError),
}
