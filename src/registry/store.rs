//! Consumer registry implementation.
//!
//! The registry caches one consumer handle per name and builds handles
//! lazily on first use.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::{ConfigSource, ConsumerConfig};
use crate::consumer::{Consumer, ConsumerFactory, HandlerError, Message};
use crate::observability::metrics;
use crate::registry::error::RegistryError;
use crate::registry::gate::{ConfigGate, ConfigState};

/// Name used by the `*_default` helpers.
pub const DEFAULT_CONSUMER: &str = "default";

/// Name-keyed cache of consumer handles.
///
/// Lookups take the read lock only. Construction runs with no lock held, so
/// a slow connect for one name never blocks other names. Two first callers
/// for the same name may both construct; the later insert wins and the
/// earlier handle is dropped from the cache while still open. That handle
/// stays connected and keeps its share of its group's messages until its
/// holder closes it.
///
/// `close` does not evict: a closed handle stays cached and is returned by
/// later lookups.
pub struct ConsumerRegistry<S, F: ConsumerFactory> {
    /// Map of consumer name to cached handle
    consumers: RwLock<HashMap<String, Arc<F::Consumer>>>,

    configs: ConfigGate<S>,

    factory: F,
}

impl<S, F> ConsumerRegistry<S, F>
where
    S: ConfigSource + 'static,
    F: ConsumerFactory,
{
    /// Create an empty registry. Nothing is loaded or connected until first use.
    pub fn new(source: S, factory: F) -> Self {
        Self {
            consumers: RwLock::new(HashMap::new()),
            configs: ConfigGate::new(source),
            factory,
        }
    }

    /// Return the cached consumer for `name`, constructing it on a miss.
    ///
    /// Construction errors are returned as is and are not cached; the next
    /// call tries again.
    pub async fn get_or_create(&self, name: &str) -> Result<Arc<F::Consumer>, RegistryError> {
        if let Some(consumer) = self.consumers.read().await.get(name) {
            metrics::record_lookup(true);
            tracing::debug!(consumer = %name, "Consumer cache hit");
            return Ok(Arc::clone(consumer));
        }

        metrics::record_lookup(false);
        self.add(name).await
    }

    /// Like [`get_or_create`](Self::get_or_create), for startup wiring where
    /// misconfiguration should halt the process.
    ///
    /// # Panics
    /// Panics with the error message if the consumer cannot be resolved.
    pub async fn get_or_panic(&self, name: &str) -> Arc<F::Consumer> {
        match self.get_or_create(name).await {
            Ok(consumer) => consumer,
            Err(e) => panic!("{e}"),
        }
    }

    /// Resolve `name` and run its consumption loop with `handler`.
    pub async fn receive<H>(&self, name: &str, handler: H) -> Result<(), RegistryError>
    where
        H: Fn(&str, &[u8], &Message) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let consumer = self.get_or_create(name).await?;
        consumer.receive(handler).await.map_err(RegistryError::Receive)
    }

    /// [`receive`](Self::receive) on the `default` consumer.
    pub async fn receive_default<H>(&self, handler: H) -> Result<(), RegistryError>
    where
        H: Fn(&str, &[u8], &Message) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.receive(DEFAULT_CONSUMER, handler).await
    }

    /// Close the cached consumer for `name`, if any.
    ///
    /// Never constructs. The entry stays in the cache.
    pub async fn close(&self, name: &str) {
        let consumer = self.consumers.read().await.get(name).cloned();
        if let Some(consumer) = consumer {
            consumer.close();
            tracing::info!(consumer = %name, "Consumer closed");
        }
    }

    /// [`close`](Self::close) on the `default` consumer.
    pub async fn close_default(&self) {
        self.close(DEFAULT_CONSUMER).await
    }

    /// Resolve the configuration section for `name` without connecting.
    pub async fn load_config(&self, name: &str) -> Result<ConsumerConfig, RegistryError> {
        self.configs.consumer_config(name).await
    }

    /// State of the one-time config load.
    pub fn config_state(&self) -> ConfigState {
        self.configs.state()
    }

    /// The configuration source.
    pub fn source(&self) -> &S {
        self.configs.source()
    }

    /// The consumer factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Check whether a handle is cached for `name`.
    pub async fn contains(&self, name: &str) -> bool {
        self.consumers.read().await.contains_key(name)
    }

    /// Number of cached handles.
    pub async fn len(&self) -> usize {
        self.consumers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Names with a cached handle, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.consumers.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    async fn add(&self, name: &str) -> Result<Arc<F::Consumer>, RegistryError> {
        let config = self.load_config(name).await?;
        let topics = config.topics.clone();

        let consumer = match self.factory.connect(config).await {
            Ok(consumer) => Arc::new(consumer),
            Err(e) => {
                metrics::record_construction(false);
                return Err(RegistryError::Construction(e));
            }
        };
        metrics::record_construction(true);

        let mut consumers = self.consumers.write().await;
        if consumers
            .insert(name.to_string(), Arc::clone(&consumer))
            .is_some()
        {
            tracing::warn!(
                consumer = %name,
                "Concurrent construction replaced a cached consumer; the previous handle stays subscribed until closed"
            );
        }
        metrics::record_cached_consumers(consumers.len());
        drop(consumers);

        tracing::info!(consumer = %name, topics = ?topics, "Consumer created");
        Ok(consumer)
    }
}
