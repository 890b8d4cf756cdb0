//! Configuration sources.
//!
//! A source parses the document on [`ConfigSource::load`] and hands out the
//! latest parsed snapshot on [`ConfigSource::get`]. Sources do not gate
//! repeated loads; the registry's config gate does that.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::loader::{load_config, parse_config, ConfigError};
use crate::config::schema::RegistryConfig;

/// Provider of the shared configuration document.
pub trait ConfigSource: Send + Sync {
    /// Human-readable identity of the whole document (path, label).
    fn location(&self) -> &str;

    /// Parse the document and publish it as the current snapshot.
    ///
    /// May block on IO; async callers run it on the blocking pool.
    fn load(&self) -> Result<(), ConfigError>;

    /// The most recently loaded snapshot.
    ///
    /// Returns an empty document if nothing has loaded successfully yet.
    fn get(&self) -> Arc<RegistryConfig>;
}

impl<S: ConfigSource + ?Sized> ConfigSource for Arc<S> {
    fn location(&self) -> &str {
        (**self).location()
    }

    fn load(&self) -> Result<(), ConfigError> {
        (**self).load()
    }

    fn get(&self) -> Arc<RegistryConfig> {
        (**self).get()
    }
}

/// TOML file on disk.
pub struct FileConfigSource {
    path: PathBuf,
    location: String,
    current: ArcSwap<RegistryConfig>,
}

impl FileConfigSource {
    /// Create a source for the given file. Nothing is read until `load`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            location: path.display().to_string(),
            path,
            current: ArcSwap::from_pointee(RegistryConfig::default()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file and swap in the new snapshot.
    ///
    /// On error the previous snapshot stays in place.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = load_config(&self.path)?;
        tracing::info!(
            path = %self.location,
            consumers = config.consumers().count(),
            "Consumer configuration loaded"
        );
        self.store(config);
        Ok(())
    }

    /// Replace the current snapshot.
    pub fn store(&self, config: RegistryConfig) {
        self.current.store(Arc::new(config));
    }
}

impl ConfigSource for FileConfigSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn load(&self) -> Result<(), ConfigError> {
        self.reload()
    }

    fn get(&self) -> Arc<RegistryConfig> {
        self.current.load_full()
    }
}

enum Document {
    Parsed(RegistryConfig),
    Raw(String),
}

/// In-memory document, for configs built in code and for tests.
pub struct StaticConfigSource {
    location: String,
    document: Document,
    current: ArcSwap<RegistryConfig>,
}

impl StaticConfigSource {
    /// Serve an already-built document.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_document("<static>", Document::Parsed(config))
    }

    /// Serve a TOML document; it is parsed and validated on `load`.
    pub fn from_toml(content: impl Into<String>) -> Self {
        Self::with_document("<inline toml>", Document::Raw(content.into()))
    }

    /// Override the label used in error messages.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    fn with_document(location: &str, document: Document) -> Self {
        Self {
            location: location.to_string(),
            document,
            current: ArcSwap::from_pointee(RegistryConfig::default()),
        }
    }

    /// Replace the current snapshot, as a reload would.
    pub fn store(&self, config: RegistryConfig) {
        self.current.store(Arc::new(config));
    }
}

impl ConfigSource for StaticConfigSource {
    fn location(&self) -> &str {
        &self.location
    }

    fn load(&self) -> Result<(), ConfigError> {
        let config = match &self.document {
            Document::Parsed(config) => config.clone(),
            Document::Raw(content) => parse_config(content)?,
        };
        self.store(config);
        Ok(())
    }

    fn get(&self) -> Arc<RegistryConfig> {
        self.current.load_full()
    }
}
