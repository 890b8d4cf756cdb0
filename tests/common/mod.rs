//! Shared stubs for registry integration tests.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use consumer_registry::config::{ConfigError, ConfigSource, ConsumerConfig, RegistryConfig, StaticConfigSource};
use consumer_registry::consumer::{Consumer, ConsumerError, ConsumerFactory, HandlerError, Message};
use tokio::sync::Notify;

/// Document used by most tests: one `default` section.
pub fn default_document() -> RegistryConfig {
    RegistryConfig::with_consumers([(
        "default",
        ConsumerConfig::new(["b1:9092"], ["t1"], "g1").receive_worker_num(4),
    )])
}

/// Config source that counts how often it is asked to load.
pub struct CountingSource {
    inner: StaticConfigSource,
    pub loads: AtomicUsize,
    load_delay: Duration,
}

impl CountingSource {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            inner: StaticConfigSource::new(config),
            loads: AtomicUsize::new(0),
            load_delay: Duration::from_millis(20),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ConfigSource for CountingSource {
    fn location(&self) -> &str {
        "counting.toml"
    }

    fn load(&self) -> Result<(), ConfigError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // Widen the window for concurrent first callers
        std::thread::sleep(self.load_delay);
        self.inner.load()
    }

    fn get(&self) -> Arc<RegistryConfig> {
        self.inner.get()
    }
}

/// Consumer handle that records its construction and close.
pub struct StubConsumer {
    pub attempt: usize,
    pub config: ConsumerConfig,
    closed: AtomicBool,
    pub close_calls: AtomicUsize,
}

impl StubConsumer {
    fn new(attempt: usize, config: ConsumerConfig) -> Self {
        Self {
            attempt,
            config,
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
        }
    }
}

impl Consumer for StubConsumer {
    fn receive<H>(&self, handler: H) -> impl Future<Output = Result<(), ConsumerError>> + Send
    where
        H: Fn(&str, &[u8], &Message) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        async move {
            if self.is_closed() {
                return Err(ConsumerError::Closed);
            }
            let message = Message::new(self.config.topics[0].clone(), 0, "k", "v");
            // Handler errors stay inside the loop
            let _ = handler(&message.topic, &message.key, &message);
            Ok(())
        }
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Factory that fails a set number of times, optionally after a delay.
#[derive(Default)]
pub struct StubFactory {
    failures_left: AtomicUsize,
    connects: AtomicUsize,
    delay: Duration,
}

impl StubFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(times: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(times),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ConsumerFactory for StubFactory {
    type Consumer = StubConsumer;

    fn connect(
        &self,
        config: ConsumerConfig,
    ) -> impl Future<Output = Result<StubConsumer, ConsumerError>> + Send {
        let attempt = self.connects.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let delay = self.delay;

        async move {
            tokio::time::sleep(delay).await;
            if fail {
                return Err(ConsumerError::Connect("broker down".into()));
            }
            Ok(StubConsumer::new(attempt, config))
        }
    }
}

/// Factory whose connects for one topic hang until [`release`](Self::release).
pub struct GatedFactory {
    topic: String,
    waiting: AtomicUsize,
    open: Notify,
}

impl GatedFactory {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            waiting: AtomicUsize::new(0),
            open: Notify::new(),
        }
    }

    /// Connects currently held at the gate.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        self.open.notify_one();
    }
}

impl ConsumerFactory for GatedFactory {
    type Consumer = StubConsumer;

    fn connect(
        &self,
        config: ConsumerConfig,
    ) -> impl Future<Output = Result<StubConsumer, ConsumerError>> + Send {
        let gated = config.topics.contains(&self.topic);

        async move {
            if gated {
                let opened = self.open.notified();
                self.waiting.fetch_add(1, Ordering::SeqCst);
                opened.await;
                self.waiting.fetch_sub(1, Ordering::SeqCst);
            }
            Ok(StubConsumer::new(0, config))
        }
    }
}
