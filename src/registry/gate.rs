//! One-time configuration gate.
//!
//! The first caller (across all consumer names) runs [`ConfigSource::load`]
//! on the blocking pool; concurrent first callers wait for that single load. The gate never fires
//! again, even when the load failed. Every call then reads the source's
//! latest snapshot, so a document that later reloads successfully (for
//! example through `ConfigWatcher`) becomes visible without re-firing.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::{ConfigSource, ConsumerConfig, RegistryConfig};
use crate::registry::error::RegistryError;

/// Outcome of the one-time load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigState {
    /// No caller has needed the configuration yet.
    Pending,
    /// The load succeeded.
    Loaded,
    /// The load failed; the gate will not retry.
    Failed(String),
}

/// Loads the configuration document exactly once and resolves consumer sections.
pub struct ConfigGate<S> {
    source: Arc<S>,
    outcome: OnceCell<Result<(), String>>,
}

impl<S: ConfigSource + 'static> ConfigGate<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            outcome: OnceCell::new(),
        }
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current gate state.
    pub fn state(&self) -> ConfigState {
        match self.outcome.get() {
            None => ConfigState::Pending,
            Some(Ok(())) => ConfigState::Loaded,
            Some(Err(reason)) => ConfigState::Failed(reason.clone()),
        }
    }

    /// The current document, loading it first if no one has yet.
    ///
    /// Fails with `ConfigMissing` when the document has no consumer sections.
    pub async fn document(&self) -> Result<Arc<RegistryConfig>, RegistryError> {
        let outcome = self
            .outcome
            .get_or_init(|| async {
                // File reads must not stall the runtime thread
                let source = Arc::clone(&self.source);
                match tokio::task::spawn_blocking(move || source.load()).await {
                    Ok(result) => result.map_err(|e| e.to_string()),
                    Err(e) => Err(format!("config load task failed: {e}")),
                }
            })
            .await;

        let snapshot = self.source.get();
        if snapshot.is_empty() {
            let reason = match outcome {
                Err(reason) => reason.clone(),
                Ok(()) => "no consumer sections".to_string(),
            };
            return Err(RegistryError::ConfigMissing {
                location: self.source.location().to_string(),
                reason,
            });
        }
        Ok(snapshot)
    }

    /// The section configured for `name`.
    pub async fn consumer_config(&self, name: &str) -> Result<ConsumerConfig, RegistryError> {
        self.document()
            .await?
            .consumer(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotConfigured(name.to_string()))
    }
}
