//! Metrics collection.
//!
//! # Metrics
//! - `consumer_registry_lookups_total` (counter): cache lookups by result (hit, miss)
//! - `consumer_registry_constructions_total` (counter): factory calls by outcome (ok, error)
//! - `consumer_registry_cached_consumers` (gauge): handles currently held by a registry
//! - `consumer_messages_handled_total` (counter): handler invocations by topic, outcome
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; installing an exporter is the binary's job
//! - Without a recorder every call is a no-op

/// Record a registry cache lookup.
pub fn record_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    ::metrics::counter!("consumer_registry_lookups_total", "result" => result).increment(1);
}

/// Record a consumer construction attempt.
pub fn record_construction(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    ::metrics::counter!("consumer_registry_constructions_total", "outcome" => outcome).increment(1);
}

/// Record how many handles a registry caches.
pub fn record_cached_consumers(count: usize) {
    ::metrics::gauge!("consumer_registry_cached_consumers").set(count as f64);
}

/// Record a handler invocation.
pub fn record_message_handled(topic: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    ::metrics::counter!(
        "consumer_messages_handled_total",
        "topic" => topic.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
