//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Asset storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Inline payload migration configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

impl AppConfig {
    /// Create a configuration rooted in `dir`.
    ///
    /// **For testing only.** Uses an in-memory metadata store.
    pub fn for_testing(dir: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig {
                root: dir.into(),
                ..StorageConfig::default()
            },
            metadata: MetadataConfig::Memory,
            migration: MigrationConfig::default(),
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()?;
        self.metadata.validate()?;
        Ok(())
    }
}

/// Asset storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Private root directory holding one `<id>.epub` file per asset.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// How full-payload writes are performed.
    #[serde(default)]
    pub write_strategy: WriteStrategy,
    /// Usage estimation settings.
    #[serde(default)]
    pub usage: UsageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            write_strategy: WriteStrategy::default(),
            usage: UsageConfig::default(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.root.as_os_str().is_empty() {
            return Err("storage root cannot be empty".to_string());
        }
        if self.usage.enabled && self.usage.quota_bytes == 0 {
            return Err("usage.quota_bytes must be greater than zero when enabled".to_string());
        }
        Ok(())
    }
}

/// Write path selection.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WriteStrategy {
    /// Probe the environment on every write (default).
    #[default]
    Auto,
    /// Always use the streaming write path.
    Direct,
    /// Always hand writes to a dedicated worker thread.
    Offloaded,
}

/// Usage estimation configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Report usage at all. When false, estimates are always `{0, 0}`.
    #[serde(default = "default_usage_enabled")]
    pub enabled: bool,
    /// Quota reported alongside usage, in bytes.
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            enabled: default_usage_enabled(),
            quota_bytes: default_quota_bytes(),
        }
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// Volatile in-process store.
    Memory,
    /// Single JSON document on disk.
    Json {
        /// Path of the JSON document.
        #[serde(default = "default_metadata_path")]
        path: PathBuf,
    },
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Json {
            path: default_metadata_path(),
        }
    }
}

impl MetadataConfig {
    /// Validate metadata configuration.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Json { path } if path.as_os_str().is_empty() => {
                Err("json metadata store requires a path".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Inline payload migration configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Sweep inline payloads into the asset store when the library opens.
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            run_on_startup: default_run_on_startup(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("./data/assets")
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("./data/books.json")
}

fn default_usage_enabled() -> bool {
    true
}

fn default_quota_bytes() -> u64 {
    2 * 1024 * 1024 * 1024 // 2 GiB
}

fn default_run_on_startup() -> bool {
    true
}
