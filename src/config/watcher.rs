//! Configuration file watcher for hot reload.

use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::source::{ConfigSource, FileConfigSource};

/// A watcher that reloads a [`FileConfigSource`] when its file changes.
pub struct ConfigWatcher {
    source: Arc<FileConfigSource>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher for the given source.
    pub fn new(source: Arc<FileConfigSource>) -> Self {
        Self { source }
    }

    /// Start watching the file in a background thread.
    ///
    /// Watching stops when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let source = Arc::clone(&self.source);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = %source.location(), "Config file change detected, reloading...");
                        if let Err(e) = source.reload() {
                            tracing::error!(
                                "Failed to reload config: {}. Keeping current configuration.",
                                e
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(self.source.path(), RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.source.path(), "Config watcher started");
        Ok(watcher)
    }
}
