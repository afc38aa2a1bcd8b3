//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ct_core::FlowConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Human cost per focus hour, USD.
    pub hourly_rate: f64,

    /// Longest gap between activity events credited outside flow, in seconds.
    pub max_idle_timeout: u64,

    /// Activity events per minute at which the user counts as in flow.
    pub flow_threshold: usize,

    /// Pattern matching primary session logs.
    pub log_glob: String,

    /// Pattern matching sub-task logs.
    pub subagent_glob: String,

    /// Count background (sub-task and compaction) spend in reports.
    pub include_background: bool,

    /// Seconds between log discovery passes while watching.
    pub rescan_interval: u64,

    /// Path to the usage database.
    pub database_path: PathBuf,

    /// Path to the activity event log.
    pub events_path: PathBuf,

    /// Repository used to resolve branches. Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            hourly_rate: 100.0,
            max_idle_timeout: 300,
            flow_threshold: 10,
            log_glob: "~/.claude/projects/*/*.jsonl".to_string(),
            subagent_glob: "~/.claude/projects/*/*/subagents/*.jsonl".to_string(),
            include_background: false,
            rescan_interval: 10,
            database_path: data_dir.join("ct.db"),
            events_path: data_dir.join("activity.jsonl"),
            repo_dir: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // CT_HOURLY_RATE, CT_LOG_GLOB, ...
        figment = figment.merge(Env::prefixed("CT_"));

        figment.extract()
    }

    pub const fn flow_config(&self) -> FlowConfig {
        FlowConfig::from_seconds(self.max_idle_timeout, self.flow_threshold)
    }

    pub const fn rescan_interval(&self) -> Duration {
        Duration::from_secs(self.rescan_interval)
    }

    /// Every log pattern the tracker reads.
    pub fn log_patterns(&self) -> [&str; 2] {
        [&self.log_glob, &self.subagent_glob]
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.repo_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Returns the platform-specific config directory for ct.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ct"))
}

/// Returns the platform-specific data directory for ct.
///
/// On Linux: `~/.local/share/ct`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ct"))
}
