//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check broker addresses are `host:port`
//! - Validate value ranges (1 <= worker count <= MAX_RECEIVE_WORKERS)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RegistryConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - An empty document is valid here; the registry reports it as missing

use thiserror::Error;

use crate::config::schema::{ConsumerConfig, RegistryConfig, MAX_RECEIVE_WORKERS};

/// A single semantic problem in one consumer section.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("consumer `{consumer}`: {field} {message}")]
pub struct ValidationError {
    /// Name of the offending consumer section.
    pub consumer: String,
    /// Field within the section.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

/// Validate every consumer section in the document.
pub fn validate_config(config: &RegistryConfig) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = config
        .consumers()
        .flat_map(|(name, cfg)| validate_consumer(name, cfg))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one consumer section.
pub fn validate_consumer(name: &str, cfg: &ConsumerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut push = |field: &'static str, message: String| {
        errors.push(ValidationError {
            consumer: name.to_string(),
            field,
            message,
        })
    };

    if cfg.addrs.is_empty() {
        push("addrs", "must list at least one broker".into());
    }
    for addr in &cfg.addrs {
        if !is_host_port(addr) {
            push("addrs", format!("entry `{}` is not host:port", addr));
        }
    }

    if cfg.topics.is_empty() {
        push("topics", "must list at least one topic".into());
    }
    if cfg.topics.iter().any(|t| t.trim().is_empty()) {
        push("topics", "must not contain blank topic names".into());
    }

    if cfg.group_id.trim().is_empty() {
        push("group_id", "must not be blank".into());
    }

    if cfg.receive_worker_num == 0 {
        push("receive_worker_num", "must be at least 1".into());
    } else if cfg.receive_worker_num > MAX_RECEIVE_WORKERS {
        push(
            "receive_worker_num",
            format!("must be at most {MAX_RECEIVE_WORKERS}"),
        );
    }

    errors
}

fn is_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.trim().is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}
