//! NetReach configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{NetreachError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetreachConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub stages: StageConfig,
    #[serde(default)]
    pub templates: TemplateConfig,
    #[serde(default)]
    pub sender: SenderConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_db_path() -> String {
    "~/.netreach/netreach.db".into()
}

impl Default for NetreachConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            quota: QuotaConfig::default(),
            search: SearchConfig::default(),
            stages: StageConfig::default(),
            templates: TemplateConfig::default(),
            sender: SenderConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl NetreachConfig {
    /// Load config from the default path (~/.netreach/config.toml),
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NetreachError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| NetreachError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| NetreachError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the NetReach home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".netreach")
    }

    /// Resolve the database path, expanding a leading `~`.
    pub fn resolved_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(rest)
        } else {
            PathBuf::from(&self.db_path)
        }
    }

    /// Environment variables win over file values for operational knobs.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_u32("NETREACH_MAX_CONNECTIONS_PER_DAY") {
            self.quota.max_connections_per_day = v;
        }
        if let Some(v) = env_u32("NETREACH_MAX_MESSAGES_PER_DAY") {
            self.quota.max_messages_per_day = v;
        }
        if let Some(v) = env_u32("NETREACH_MAX_SEARCHES_PER_DAY") {
            self.quota.max_searches_per_day = v;
        }
        if let Ok(v) = std::env::var("NETREACH_COOLDOWN_SECS") {
            if let Ok(secs) = v.parse::<u64>() {
                self.quota.cooldown_secs = secs;
            }
        }
    }
}

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
}

/// Daily ceilings and inter-action pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections_per_day: u32,
    #[serde(default = "default_max_messages")]
    pub max_messages_per_day: u32,
    #[serde(default = "default_max_searches")]
    pub max_searches_per_day: u32,
    /// Minimum seconds between two consecutive actions.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Extra random 0..=N seconds added to every cooldown wait.
    #[serde(default = "default_cooldown_jitter")]
    pub cooldown_jitter_secs: u64,
}

fn default_max_connections() -> u32 { 14 }
fn default_max_messages() -> u32 { 50 }
fn default_max_searches() -> u32 { 100 }
fn default_cooldown_secs() -> u64 { 30 }
fn default_cooldown_jitter() -> u64 { 4 }

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_connections_per_day: default_max_connections(),
            max_messages_per_day: default_max_messages(),
            max_searches_per_day: default_max_searches(),
            cooldown_secs: default_cooldown_secs(),
            cooldown_jitter_secs: default_cooldown_jitter(),
        }
    }
}

/// People-search criteria for the discovery stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    /// Result pages to walk per run. 1 disables next-button paging.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Contacts seen within this many days are skipped as duplicates.
    #[serde(default = "default_duplicate_window")]
    pub duplicate_window_days: u32,
}

fn default_max_pages() -> u32 { 1 }
fn default_duplicate_window() -> u32 { 30 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: String::new(),
            job_title: String::new(),
            company: String::new(),
            location: String::new(),
            max_pages: default_max_pages(),
            duplicate_window_days: default_duplicate_window(),
        }
    }
}

/// Which pipeline stages run, and their per-run batch limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default = "bool_true")]
    pub discovery: bool,
    #[serde(default = "bool_true")]
    pub connect: bool,
    #[serde(default)]
    pub status_poll: bool,
    #[serde(default)]
    pub inbox_sweep: bool,
    #[serde(default)]
    pub messaging: bool,
    #[serde(default = "default_connections_per_run")]
    pub max_connections_per_run: u32,
    #[serde(default = "default_messages_per_run")]
    pub max_messages_per_run: u32,
}

fn bool_true() -> bool { true }
fn default_connections_per_run() -> u32 { 5 }
fn default_messages_per_run() -> u32 { 3 }

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            discovery: true,
            connect: true,
            status_poll: false,
            inbox_sweep: false,
            messaging: false,
            max_connections_per_run: default_connections_per_run(),
            max_messages_per_run: default_messages_per_run(),
        }
    }
}

/// Default template identifiers per outreach kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Empty string sends connection requests without a note.
    #[serde(default = "default_note_template")]
    pub connection_note: String,
    #[serde(default = "default_message_template")]
    pub message: String,
}

fn default_note_template() -> String { "conn_generic".into() }
fn default_message_template() -> String { "msg_introduction".into() }

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            connection_note: default_note_template(),
            message: default_message_template(),
        }
    }
}

/// Who the outreach is from — substituted into templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SenderConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub custom_reason: String,
}

/// Active-hours gate. When enabled, runs refuse to start outside the
/// configured local-time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "default_end_hour")]
    pub end_hour: u32,
    #[serde(default = "bool_true")]
    pub weekdays_only: bool,
}

fn default_start_hour() -> u32 { 9 }
fn default_end_hour() -> u32 { 17 }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            weekdays_only: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetreachConfig::default();
        assert_eq!(config.quota.max_connections_per_day, 14);
        assert_eq!(config.quota.max_messages_per_day, 50);
        assert_eq!(config.quota.max_searches_per_day, 100);
        assert_eq!(config.quota.cooldown_secs, 30);
        assert_eq!(config.search.max_pages, 1);
        assert_eq!(config.search.duplicate_window_days, 30);
        assert!(config.stages.discovery);
        assert!(!config.stages.messaging);
        assert_eq!(config.templates.connection_note, "conn_generic");
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            db_path = "/tmp/test.db"

            [quota]
            max_connections_per_day = 7
            cooldown_secs = 5

            [search]
            keywords = "platform engineer"
            max_pages = 3

            [sender]
            name = "Dana Reyes"
            title = "Founder"
        "#;

        let config: NetreachConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.db_path, "/tmp/test.db");
        assert_eq!(config.quota.max_connections_per_day, 7);
        assert_eq!(config.quota.cooldown_secs, 5);
        // Untouched fields keep defaults
        assert_eq!(config.quota.max_messages_per_day, 50);
        assert_eq!(config.search.keywords, "platform engineer");
        assert_eq!(config.search.max_pages, 3);
        assert_eq!(config.sender.name, "Dana Reyes");
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: NetreachConfig = toml::from_str("").unwrap();
        assert_eq!(config.quota.max_connections_per_day, 14);
        assert_eq!(config.schedule.start_hour, 9);
        assert_eq!(config.schedule.end_hour, 17);
        assert!(config.schedule.weekdays_only);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("NETREACH_MAX_CONNECTIONS_PER_DAY", "3");
        std::env::set_var("NETREACH_COOLDOWN_SECS", "0");
        let mut config = NetreachConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.quota.max_connections_per_day, 3);
        assert_eq!(config.quota.cooldown_secs, 0);
        std::env::remove_var("NETREACH_MAX_CONNECTIONS_PER_DAY");
        std::env::remove_var("NETREACH_COOLDOWN_SECS");
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        std::env::set_var("NETREACH_MAX_MESSAGES_PER_DAY", "not-a-number");
        let mut config = NetreachConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.quota.max_messages_per_day, 50);
        std::env::remove_var("NETREACH_MAX_MESSAGES_PER_DAY");
    }

    #[test]
    fn test_home_dir() {
        let home = NetreachConfig::home_dir();
        assert!(home.to_string_lossy().contains("netreach"));
    }
}
