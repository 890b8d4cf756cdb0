//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::RegistryConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate a TOML document.
pub fn parse_config(content: &str) -> Result<RegistryConfig, ConfigError> {
    let config: RegistryConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RegistryConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [kafka.consumer.default]
            addrs = ["b1:9092"]
            topics = ["t1"]
            group_id = "g1"
            receive_worker_num = 4
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.consumer("default").unwrap().group_id, "g1");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/consumers.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/consumers.toml"));
    }

    #[test]
    fn test_parse_and_validation_errors() {
        let err = parse_config("[kafka.consumer.default]\naddrs = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = parse_config(
            r#"
            [kafka.consumer.default]
            addrs = []
            topics = ["t1"]
            group_id = "g1"
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors[0].field, "addrs"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
