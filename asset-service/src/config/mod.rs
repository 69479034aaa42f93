use serde::Deserialize;

use asset_core::config::{self as core_config, ConfigError};

#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub drive: DriveConfig,
}

impl AssetConfig {
    pub fn load() -> Result<Self, ConfigError> {
        core_config::load()
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            import: ImportConfig::default(),
            storage: StorageConfig::default(),
            drive: DriveConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: i64,
    #[serde(default = "default_blocked_mime_prefixes")]
    pub blocked_mime_prefixes: Vec<String>,
    /// Import requests allowed per user per window.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_rate_window_seconds")]
    pub rate_window_seconds: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size_bytes(),
            blocked_mime_prefixes: default_blocked_mime_prefixes(),
            rate_limit: default_rate_limit(),
            rate_window_seconds: default_rate_window_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_local_path")]
    pub local_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_path: default_local_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_max_file_size_bytes() -> i64 {
    25 * 1024 * 1024
}

fn default_blocked_mime_prefixes() -> Vec<String> {
    // Provider-native documents have no byte representation to download.
    vec!["application/vnd.google-apps.".to_string()]
}

fn default_rate_limit() -> u32 {
    20
}

fn default_rate_window_seconds() -> u64 {
    3600
}

fn default_local_path() -> String {
    "storage".to_string()
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}
