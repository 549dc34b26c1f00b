//! Document store configuration via `docstore.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use docstore_storage::codec::{get_codec, DEFAULT_COMPRESSION_LEVEL};

/// Config file name used by convention.
pub const CONFIG_FILE_NAME: &str = "docstore.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("config file '{path}': {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A field holds an unusable value
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Document store configuration.
///
/// # Example
///
/// ```toml
/// codecs = ["checksum", "zstd"]
/// compression_level = 3
/// cache_capacity = 1024
/// transaction_timeout_secs = 60
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStoreConfig {
    /// Data column codecs; the first sits closest to the stored bytes.
    #[serde(default)]
    pub codecs: Vec<String>,
    /// zstd level used when the `zstd` codec is configured.
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
    /// Maximum number of decoded documents cached; 0 disables the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Default timeout for transactions that do not specify one.
    #[serde(default = "default_transaction_timeout_secs")]
    pub transaction_timeout_secs: u64,
}

fn default_compression_level() -> i32 {
    DEFAULT_COMPRESSION_LEVEL
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_transaction_timeout_secs() -> u64 {
    60
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            codecs: Vec::new(),
            compression_level: default_compression_level(),
            cache_capacity: default_cache_capacity(),
            transaction_timeout_secs: default_transaction_timeout_secs(),
        }
    }
}

impl DocumentStoreConfig {
    /// Config with caching disabled.
    pub fn without_cache(mut self) -> Self {
        self.cache_capacity = 0;
        self
    }

    /// Config with the given codec list.
    pub fn with_codecs<I, S>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codecs = codecs.into_iter().map(Into::into).collect();
        self
    }

    /// Default transaction timeout.
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout_secs)
    }

    /// Check that every field is usable.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` for an unknown codec, a compression level
    /// outside 1..=22, or a zero transaction timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for id in &self.codecs {
            get_codec(id, self.compression_level).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if !(1..=22).contains(&self.compression_level) {
            return Err(ConfigError::Invalid(format!(
                "compression_level must be between 1 and 22, got {}",
                self.compression_level
            )));
        }
        if self.transaction_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "transaction_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# docstore configuration
#
# Data column codecs. The first codec sits closest to the stored bytes.
# Known codecs: "identity", "zstd", "checksum"
codecs = []

# zstd compression level (1-22), used when "zstd" is listed above
compression_level = 3

# Number of decoded documents kept in the LRU cache (0 disables caching)
cache_capacity = 1024

# Timeout for transactions that do not specify one
transaction_timeout_secs = 60
"#
    }

    /// Parse and validate config text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DocumentStoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
