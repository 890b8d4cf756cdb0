//! In-process broker and consumer.
//!
//! # Responsibilities
//! - Implement `ConsumerFactory` without a network broker
//! - Simulate broker outages through the listener set
//! - Deliver each published message once per consumer group
//! - Bound handler concurrency by `receive_worker_num`

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tokio::sync::{mpsc, watch, Mutex, Semaphore};

use crate::config::{ConsumerConfig, MAX_RECEIVE_WORKERS};
use crate::consumer::handle::{Consumer, ConsumerError, ConsumerFactory};
use crate::consumer::message::{HandlerError, Message};
use crate::observability::metrics;

struct Subscription {
    consumer_id: u64,
    group_id: String,
    tx: mpsc::UnboundedSender<Message>,
}

#[derive(Default)]
struct BrokerState {
    /// Addresses currently accepting connections.
    listeners: DashSet<String>,
    /// topic -> live subscriptions
    subscriptions: DashMap<String, Vec<Subscription>>,
    /// topic -> next offset
    offsets: DashMap<String, i64>,
    next_id: AtomicU64,
}

/// A broker living inside the process.
///
/// Cloning shares the same broker.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    inner: Arc<BrokerState>,
}

impl MemoryBroker {
    /// Create a broker with no listeners; every connect fails until `listen`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept connections on `addr`.
    pub fn listen(&self, addr: impl Into<String>) {
        self.inner.listeners.insert(addr.into());
    }

    /// Stop accepting connections on `addr`. Existing consumers are unaffected.
    pub fn shutdown_listener(&self, addr: &str) {
        self.inner.listeners.remove(addr);
    }

    /// Publish a message, returning how many consumer groups it was delivered to.
    pub fn publish(&self, topic: &str, key: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> usize {
        let offset = {
            let mut next = self.inner.offsets.entry(topic.to_string()).or_insert(0);
            let offset = *next;
            *next += 1;
            offset
        };

        let Some(subscriptions) = self.inner.subscriptions.get(topic) else {
            return 0;
        };

        let mut groups: BTreeMap<&str, Vec<&Subscription>> = BTreeMap::new();
        for sub in subscriptions.iter().filter(|s| !s.tx.is_closed()) {
            groups.entry(sub.group_id.as_str()).or_default().push(sub);
        }

        let key = key.into();
        let payload = payload.into();
        let mut delivered = 0;
        for members in groups.values() {
            // Round-robin within the group
            let target = members[offset as usize % members.len()];
            let message = Message::new(topic, offset, key.clone(), payload.clone());
            if target.tx.send(message).is_ok() {
                delivered += 1;
            }
        }

        tracing::trace!(topic = %topic, offset, groups = delivered, "Message published");
        delivered
    }

    /// Number of live subscriptions on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .subscriptions
            .get(topic)
            .map_or(0, |subs| subs.len())
    }

    fn detach(&self, consumer_id: u64) {
        for mut entry in self.inner.subscriptions.iter_mut() {
            entry.value_mut().retain(|s| s.consumer_id != consumer_id);
        }
    }
}

impl ConsumerFactory for MemoryBroker {
    type Consumer = MemoryConsumer;

    fn connect(
        &self,
        config: ConsumerConfig,
    ) -> impl std::future::Future<Output = Result<MemoryConsumer, ConsumerError>> + Send {
        let broker = self.clone();
        async move {
            if !config
                .addrs
                .iter()
                .any(|addr| broker.inner.listeners.contains(addr))
            {
                return Err(ConsumerError::Unreachable {
                    addrs: config.addrs.clone(),
                });
            }

            let id = broker.inner.next_id.fetch_add(1, Ordering::Relaxed);
            let (tx, rx) = mpsc::unbounded_channel();
            for topic in &config.topics {
                broker
                    .inner
                    .subscriptions
                    .entry(topic.clone())
                    .or_default()
                    .push(Subscription {
                        consumer_id: id,
                        group_id: config.group_id.clone(),
                        tx: tx.clone(),
                    });
            }

            tracing::info!(
                consumer_id = id,
                group_id = %config.group_id,
                topics = ?config.topics,
                "Memory consumer connected"
            );

            Ok(MemoryConsumer::new(id, broker, config, rx))
        }
    }
}

/// Consumer handle produced by [`MemoryBroker`].
pub struct MemoryConsumer {
    id: u64,
    broker: MemoryBroker,
    config: ConsumerConfig,
    inbox: Mutex<Option<mpsc::UnboundedReceiver<Message>>>,
    closed: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl MemoryConsumer {
    fn new(
        id: u64,
        broker: MemoryBroker,
        config: ConsumerConfig,
        inbox: mpsc::UnboundedReceiver<Message>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            id,
            broker,
            config,
            inbox: Mutex::new(Some(inbox)),
            closed: AtomicBool::new(false),
            shutdown,
        }
    }

    /// Broker-assigned identifier, unique per connect.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The configuration this consumer was built from.
    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }
}

impl Consumer for MemoryConsumer {
    fn receive<H>(&self, handler: H) -> impl std::future::Future<Output = Result<(), ConsumerError>> + Send
    where
        H: Fn(&str, &[u8], &Message) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        async move {
            // Subscribe before the closed check so a concurrent close still wakes us
            let mut shutdown = self.shutdown.subscribe();
            if self.is_closed() {
                return Err(ConsumerError::Closed);
            }

            let mut inbox = self
                .inbox
                .lock()
                .await
                .take()
                .ok_or(ConsumerError::AlreadyReceiving)?;

            // Configs built in code skip validation
            let workers = self.config.receive_worker_num.clamp(1, MAX_RECEIVE_WORKERS);
            let all_permits = u32::try_from(workers).unwrap_or(u32::MAX);
            let permits = Arc::new(Semaphore::new(workers));
            let handler = Arc::new(handler);

            tracing::info!(
                consumer_id = self.id,
                topics = ?self.config.topics,
                workers,
                "Receive loop started"
            );

            loop {
                let message = tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    message = inbox.recv() => match message {
                        Some(message) => message,
                        None => break,
                    },
                };

                let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                    break;
                };
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    let _permit = permit;
                    let outcome = handler(&message.topic, &message.key, &message);
                    if let Err(e) = &outcome {
                        tracing::warn!(
                            topic = %message.topic,
                            offset = message.offset,
                            error = %e,
                            "Message handler failed"
                        );
                    }
                    metrics::record_message_handled(&message.topic, outcome.is_ok());
                });
            }

            // Wait for in-flight handlers
            let _ = permits.acquire_many(all_permits).await;

            tracing::info!(consumer_id = self.id, "Receive loop stopped");
            Ok(())
        }
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.broker.detach(self.id);
        self.shutdown.send_replace(true);
        tracing::info!(
            consumer_id = self.id,
            group_id = %self.config.group_id,
            "Memory consumer closed"
        );
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
