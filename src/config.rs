//! Indexer configuration with precedence tracking.
//!
//! Every setting is resolved from four layers, highest precedence last:
//!
//! | Layer        | Source                                             |
//! |--------------|----------------------------------------------------|
//! | Default      | built-in value                                     |
//! | Config file  | `declgraph.json` in the root, or `--config <path>` |
//! | Environment  | `DECLGRAPH_THREADS`, `DECLGRAPH_DIALECT`, `DECLGRAPH_MAX_FILE_BYTES` |
//! | CLI flag     | `--threads`, `--dialect`                           |
//!
//! Each resolved value remembers where it came from ([`ConfigSource`]) so
//! callers can report it.

use std::path::{Path, PathBuf};

use declgraph_cfamily::Dialect;
use declgraph_core::error::IndexError;
use serde::Deserialize;
use tracing::debug;

/// Default config file name, looked up in the indexing root.
pub const CONFIG_FILE_NAME: &str = "declgraph.json";

/// Default upper bound on a single input file.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 8 * 1024 * 1024;

pub const ENV_THREADS: &str = "DECLGRAPH_THREADS";
pub const ENV_DIALECT: &str = "DECLGRAPH_DIALECT";
pub const ENV_MAX_FILE_BYTES: &str = "DECLGRAPH_MAX_FILE_BYTES";

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From the JSON config file.
    ConfigFile = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From CLI flag (highest precedence).
    CliFlag = 3,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Layers
// ============================================================================

/// Contents of a JSON config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub threads: Option<usize>,
    pub default_dialect: Option<String>,
    pub max_file_bytes: Option<u64>,
}

impl ConfigFile {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            IndexError::invalid_config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            IndexError::invalid_config(format!("cannot parse {}: {}", path.display(), e))
        })
    }
}

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --threads flag.
    pub threads: Option<usize>,
    /// --dialect flag.
    pub dialect: Option<String>,
    /// --config flag.
    pub config: Option<PathBuf>,
}

// ============================================================================
// Resolved Configuration
// ============================================================================

/// Resolved indexer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Worker threads for the per-file phase; `None` lets rayon decide.
    pub threads: ConfigValue<Option<usize>>,
    /// Dialect for files whose extension does not name one.
    pub default_dialect: ConfigValue<Dialect>,
    /// Larger files are rejected as unreadable input.
    pub max_file_bytes: ConfigValue<u64>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig {
            threads: ConfigValue::new(None, ConfigSource::Default),
            default_dialect: ConfigValue::new(Dialect::default(), ConfigSource::Default),
            max_file_bytes: ConfigValue::new(DEFAULT_MAX_FILE_BYTES, ConfigSource::Default),
        }
    }
}

impl IndexerConfig {
    /// Resolve configuration from all sources, reading the process
    /// environment.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables
    /// 3. Config file (`--config`, else `declgraph.json` under `root`)
    /// 4. Defaults
    pub fn resolve(root: &Path, overrides: &CliOverrides) -> Result<Self, IndexError> {
        Self::resolve_with_env(root, overrides, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with_env(
        root: &Path,
        overrides: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, IndexError> {
        let mut config = IndexerConfig::default();

        let file = match &overrides.config {
            Some(path) => Some(ConfigFile::load(path)?),
            None => {
                let path = root.join(CONFIG_FILE_NAME);
                if path.is_file() {
                    Some(ConfigFile::load(&path)?)
                } else {
                    None
                }
            }
        };
        if let Some(file) = file {
            config.apply_file(&file)?;
        }
        config.apply_env(env)?;
        config.apply_cli(overrides)?;

        debug!(
            threads = ?config.threads.value,
            dialect = %config.default_dialect.value,
            max_file_bytes = config.max_file_bytes.value,
            "configuration resolved"
        );
        Ok(config)
    }

    fn apply_file(&mut self, file: &ConfigFile) -> Result<(), IndexError> {
        if let Some(threads) = file.threads {
            self.set_threads(threads, ConfigSource::ConfigFile)?;
        }
        if let Some(dialect) = &file.default_dialect {
            self.set_dialect(dialect, ConfigSource::ConfigFile)?;
        }
        if let Some(bytes) = file.max_file_bytes {
            self.set_max_file_bytes(bytes, ConfigSource::ConfigFile)?;
        }
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), IndexError> {
        if let Some(threads) = env(ENV_THREADS) {
            let threads = parse_number(ENV_THREADS, &threads)?;
            self.set_threads(threads, ConfigSource::EnvVar)?;
        }
        if let Some(dialect) = env(ENV_DIALECT) {
            self.set_dialect(&dialect, ConfigSource::EnvVar)?;
        }
        if let Some(bytes) = env(ENV_MAX_FILE_BYTES) {
            let bytes = parse_number(ENV_MAX_FILE_BYTES, &bytes)?;
            self.set_max_file_bytes(bytes, ConfigSource::EnvVar)?;
        }
        Ok(())
    }

    fn apply_cli(&mut self, overrides: &CliOverrides) -> Result<(), IndexError> {
        if let Some(threads) = overrides.threads {
            self.set_threads(threads, ConfigSource::CliFlag)?;
        }
        if let Some(dialect) = &overrides.dialect {
            self.set_dialect(dialect, ConfigSource::CliFlag)?;
        }
        Ok(())
    }

    fn set_threads(&mut self, threads: usize, source: ConfigSource) -> Result<(), IndexError> {
        if threads == 0 {
            return Err(IndexError::invalid_config("threads must be at least 1"));
        }
        let value = ConfigValue::new(Some(threads), source);
        self.threads = self.threads.clone().merge(value);
        Ok(())
    }

    fn set_dialect(&mut self, text: &str, source: ConfigSource) -> Result<(), IndexError> {
        let dialect: Dialect = text
            .parse()
            .map_err(|e: declgraph_cfamily::UnknownDialect| IndexError::invalid_config(e.to_string()))?;
        self.default_dialect = self
            .default_dialect
            .clone()
            .merge(ConfigValue::new(dialect, source));
        Ok(())
    }

    fn set_max_file_bytes(&mut self, bytes: u64, source: ConfigSource) -> Result<(), IndexError> {
        if bytes == 0 {
            return Err(IndexError::invalid_config("max_file_bytes must be at least 1"));
        }
        self.max_file_bytes = self
            .max_file_bytes
            .clone()
            .merge(ConfigValue::new(bytes, source));
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, text: &str) -> Result<T, IndexError> {
    text.trim()
        .parse()
        .map_err(|_| IndexError::invalid_config(format!("{} must be a positive integer, got '{}'", key, text)))
}
