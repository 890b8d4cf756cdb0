//! Consumer handle and factory interfaces.
//!
//! # Responsibilities
//! - Define what the registry needs from a consumer: a consumption loop and close
//! - Define how a consumer is built from one `ConsumerConfig`
//!
//! # Design Decisions
//! - Handles are shared behind `Arc`, so every method takes `&self`
//! - `close` is synchronous and idempotent; a closed handle stays a valid value
//! - Futures are declared `Send` so registry calls can run inside spawned tasks

use std::future::Future;

use thiserror::Error;

use crate::config::ConsumerConfig;
use crate::consumer::message::{HandlerError, Message};

/// Errors surfaced by consumer construction and consumption loops.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsumerError {
    /// None of the configured brokers accepted a connection.
    #[error("no reachable broker among {addrs:?}")]
    Unreachable { addrs: Vec<String> },

    /// Connection setup failed for another reason.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The handle has been closed.
    #[error("consumer is closed")]
    Closed,

    /// A consumption loop is already running on this handle.
    #[error("consumer is already receiving")]
    AlreadyReceiving,
}

/// An open subscription to a set of topics under one consumer group.
pub trait Consumer: Send + Sync + 'static {
    /// Run the consumption loop, passing each message to `handler` as
    /// `(topic, key, message)`.
    ///
    /// Resolves when the loop stops.
    fn receive<H>(&self, handler: H) -> impl Future<Output = Result<(), ConsumerError>> + Send
    where
        H: Fn(&str, &[u8], &Message) -> Result<(), HandlerError> + Send + Sync + 'static;

    /// Release broker resources. Calling it again is a no-op.
    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Builds consumer handles from configuration.
pub trait ConsumerFactory: Send + Sync {
    type Consumer: Consumer;

    /// Connect a new consumer. Any error is returned to the registry caller as is.
    fn connect(
        &self,
        config: ConsumerConfig,
    ) -> impl Future<Output = Result<Self::Consumer, ConsumerError>> + Send;
}
