//! Sync core configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub auto_sync: AutoSyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote range service
    pub base_url: String,

    #[serde(default = "default_reference_path")]
    pub reference_path: String,

    #[serde(default = "default_agreement_path")]
    pub agreement_path: String,

    /// Plan endpoint; GETs append the remote plan id
    #[serde(default = "default_plan_path")]
    pub plan_path: String,

    /// `:id` is replaced with the owning plan's remote id
    #[serde(default = "default_pasture_path")]
    pub pasture_path: String,

    /// `:id` is replaced with the owning plan's remote id
    #[serde(default = "default_issue_path")]
    pub issue_path: String,

    /// `:planId?` and `:issueId?` are replaced with the owning remote ids
    #[serde(default = "default_action_path")]
    pub action_path: String,

    /// `:id` is replaced with the owning plan's remote id
    #[serde(default = "default_schedule_path")]
    pub schedule_path: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the local SQLite database
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSyncConfig {
    /// Whether the background auto-sync listener starts enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Listener tick interval in seconds
    #[serde(default = "default_auto_sync_interval")]
    pub interval_secs: u64,
}

impl Default for AutoSyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_auto_sync_interval(),
        }
    }
}

// Defaults
fn default_reference_path() -> String { "v1/reference".to_string() }
fn default_agreement_path() -> String { "v1/agreement".to_string() }
fn default_plan_path() -> String { "v1/plan/".to_string() }
fn default_pasture_path() -> String { "v1/plan/:id/pasture".to_string() }
fn default_issue_path() -> String { "v1/plan/:id/issue".to_string() }
fn default_action_path() -> String { "v1/plan/:planId?/issue/:issueId?/action".to_string() }
fn default_schedule_path() -> String { "v1/plan/:id/schedule".to_string() }
fn default_request_timeout() -> u64 { 30 }
fn default_auto_sync_interval() -> u64 { 60 }
fn default_true() -> bool { true }

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}
