//! Messages delivered to consumer handlers.

use std::time::SystemTime;

/// Error returned by a message handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A single message pulled from a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Vec<u8>,
    pub payload: Vec<u8>,
    pub timestamp: SystemTime,
}

impl Message {
    pub fn new(
        topic: impl Into<String>,
        offset: i64,
        key: impl Into<Vec<u8>>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            topic: topic.into(),
            partition: 0,
            offset,
            key: key.into(),
            payload: payload.into(),
            timestamp: SystemTime::now(),
        }
    }
}
