//! ResinBot configuration system.
//!
//! Loaded once at startup from `~/.resinbot/config.toml` and immutable
//! afterwards. Every field has a serde default so a missing or empty file
//! yields a runnable configuration (minus channel credentials).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ResinBotError, Result};
use crate::regen::RESIN_CAP;

/// Lowest threshold the config accepts. Anything below fires the reminder
/// almost immediately after any legal update.
pub const MIN_THRESHOLD: u32 = 130;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResinBotConfig {
    /// Resin count at which the "reached" reminder fires. Valid range 130–160.
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Send a second reminder one hour after the count overflows the cap.
    #[serde(default)]
    pub notify_overflow: bool,
    /// Extra command names recognized alongside `resin`.
    #[serde(default = "default_aliases")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
}

fn default_threshold() -> u32 {
    150
}

fn default_aliases() -> Vec<String> {
    vec![
        "tili".to_string(),
        "tl".to_string(),
        "树脂".to_string(),
        "体力".to_string(),
    ]
}

impl Default for ResinBotConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            notify_overflow: false,
            aliases: default_aliases(),
            store: StoreConfig::default(),
            channel: ChannelConfig::default(),
        }
    }
}

impl ResinBotConfig {
    /// Load config from the default path (~/.resinbot/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ResinBotError::Config(format!("failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ResinBotError::Config(format!("failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ResinBotError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the ResinBot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resinbot")
    }

    /// Reject thresholds outside the supported window.
    pub fn validate(&self) -> Result<()> {
        if self.threshold < MIN_THRESHOLD || self.threshold > RESIN_CAP {
            return Err(ResinBotError::Config(format!(
                "threshold {} is outside the supported range {MIN_THRESHOLD}-{RESIN_CAP}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// All names the resin command answers to, primary name first.
    pub fn command_names(&self) -> Vec<&str> {
        std::iter::once("resin")
            .chain(self.aliases.iter().map(String::as_str))
            .collect()
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database path. Tilde is expanded by the binary.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    "~/.resinbot/records.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Channel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

/// Telegram channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between long-polling rounds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    1
}
