//! Configuration schema definitions.
//!
//! The document shape mirrors the deployed TOML layout: one `[kafka]` table
//! holding a named collection of consumer sections.
//!
//! ```toml
//! [kafka.consumer.default]
//! addrs = ["b1:9092"]
//! topics = ["t1"]
//! group_id = "g1"
//! receive_worker_num = 4
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of the configuration document.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Broker settings. Absent when the document has no `[kafka]` table.
    pub kafka: Option<KafkaConfig>,
}

impl RegistryConfig {
    /// Build a document from `(name, section)` pairs.
    pub fn with_consumers<I, N>(consumers: I) -> Self
    where
        I: IntoIterator<Item = (N, ConsumerConfig)>,
        N: Into<String>,
    {
        Self {
            kafka: Some(KafkaConfig {
                consumers: consumers
                    .into_iter()
                    .map(|(name, cfg)| (name.into(), cfg))
                    .collect(),
            }),
        }
    }

    /// All consumer sections, empty when the `[kafka]` table is missing.
    pub fn consumers(&self) -> impl Iterator<Item = (&str, &ConsumerConfig)> {
        self.kafka
            .iter()
            .flat_map(|k| k.consumers.iter())
            .map(|(name, cfg)| (name.as_str(), cfg))
    }

    /// Look up a single consumer section.
    pub fn consumer(&self, name: &str) -> Option<&ConsumerConfig> {
        self.kafka.as_ref()?.consumers.get(name)
    }

    /// True when the document defines no consumer sections at all.
    pub fn is_empty(&self) -> bool {
        self.kafka
            .as_ref()
            .map_or(true, |k| k.consumers.is_empty())
    }
}

/// The `[kafka]` table.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct KafkaConfig {
    /// Consumer sections keyed by consumer name.
    #[serde(rename = "consumer", default)]
    pub consumers: BTreeMap<String, ConsumerConfig>,
}

/// Settings for one named consumer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConsumerConfig {
    /// Broker addresses (`host:port`).
    pub addrs: Vec<String>,

    /// Topics to subscribe to.
    pub topics: Vec<String>,

    /// Consumer group identifier.
    pub group_id: String,

    /// How many messages the consumption loop may handle concurrently.
    #[serde(default = "default_receive_worker_num")]
    pub receive_worker_num: usize,
}

/// Upper bound on `receive_worker_num`.
pub const MAX_RECEIVE_WORKERS: usize = 1024;

fn default_receive_worker_num() -> usize {
    1
}

impl ConsumerConfig {
    /// Create a section with a single worker.
    pub fn new<A, T>(addrs: A, topics: T, group_id: impl Into<String>) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            addrs: addrs.into_iter().map(Into::into).collect(),
            topics: topics.into_iter().map(Into::into).collect(),
            group_id: group_id.into(),
            receive_worker_num: default_receive_worker_num(),
        }
    }

    /// Set the worker-concurrency hint.
    pub fn receive_worker_num(mut self, workers: usize) -> Self {
        self.receive_worker_num = workers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_sections() {
        let doc: RegistryConfig = toml::from_str(
            r#"
            [kafka.consumer.default]
            addrs = ["b1:9092", "b2:9092"]
            topics = ["t1"]
            group_id = "g1"
            receive_worker_num = 4

            [kafka.consumer.audit]
            addrs = ["b1:9092"]
            topics = ["audit"]
            group_id = "auditors"
            "#,
        )
        .unwrap();

        let default = doc.consumer("default").unwrap();
        assert_eq!(default.addrs, vec!["b1:9092", "b2:9092"]);
        assert_eq!(default.receive_worker_num, 4);

        // Worker count falls back to one
        assert_eq!(doc.consumer("audit").unwrap().receive_worker_num, 1);
        assert_eq!(doc.consumers().count(), 2);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_empty_documents() {
        let no_kafka: RegistryConfig = toml::from_str("").unwrap();
        assert!(no_kafka.is_empty());
        assert!(no_kafka.consumer("default").is_none());

        let no_sections: RegistryConfig = toml::from_str("[kafka]").unwrap();
        assert!(no_sections.kafka.is_some());
        assert!(no_sections.is_empty());
    }
}
