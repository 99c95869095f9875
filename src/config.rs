use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use serde::Deserialize;

use crate::api::binance::ws::BINANCE_WS_URL;
use crate::error::{PriceWatchError, Result};
use crate::monitor::targets::TargetTable;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "PRICEWATCH_CONFIG";
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Debug, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    pub telegram: TelegramConfig,
    pub alerts: AlertsConfig,
    pub logging: LoggingConfig,
    pub targets: TargetTable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_ws_base_url")]
    pub ws_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,
    #[serde(default)]
    pub chat_ids: Vec<i64>,
    #[serde(skip)]
    pub bot_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_true")]
    pub dedup: bool,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LevelFilter,
}

#[derive(Debug, Deserialize)]
struct RawLoggingConfig {
    #[serde(default = "default_log_level")]
    level: String,
}

/// On-disk shape; `targets` is validated into a [`TargetTable`] afterwards.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    feed: FeedConfig,
    #[serde(default)]
    telegram: TelegramConfig,
    #[serde(default)]
    alerts: AlertsConfig,
    #[serde(default)]
    logging: RawLoggingConfig,
    #[serde(default)]
    targets: BTreeMap<String, Vec<f64>>,
}

fn default_ws_base_url() -> String {
    BINANCE_WS_URL.to_string()
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_base_url: default_ws_base_url(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_telegram_api(),
            chat_ids: Vec::new(),
            bot_token: None,
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            dedup: true,
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl Default for RawLoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AlertsConfig {
    /// Cool-down window, or `None` when repeated alerts are not suppressed.
    pub fn cooldown(&self) -> Option<Duration> {
        if self.dedup {
            Some(Duration::from_secs(self.cooldown_secs))
        } else {
            None
        }
    }
}

impl Config {
    /// Reads `.env`, then the TOML file named by `PRICEWATCH_CONFIG`
    /// (or `config/default.toml`). The bot token only comes from the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_path(Path::new(&path))?;

        config.telegram.bot_token = std::env::var(BOT_TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PriceWatchError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text)?;
        let targets = TargetTable::new(raw.targets)?;
        let level = LevelFilter::from_str(raw.logging.level.trim()).map_err(|_| {
            PriceWatchError::ConfigError(format!(
                "unknown logging.level {:?}, expected off/error/warn/info/debug/trace",
                raw.logging.level
            ))
        })?;

        Ok(Self {
            feed: raw.feed,
            telegram: raw.telegram,
            alerts: raw.alerts,
            logging: LoggingConfig { level },
            targets,
        })
    }
}
