use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid date_format {0:?}: not a valid strftime pattern")]
    InvalidDateFormat(String),
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub listen_addr: String,
    /// Public base URL used to register tenant webhooks. Registration is skipped when unset.
    pub site_url: Option<String>,
    pub telegram_api_url: String,
    pub telegram_timeout_secs: u64,
    pub log_dir: String,
    /// strftime pattern for campaign dates, checked at load.
    pub date_format: String,
    /// Upper bound on in-flight sends during one campaign broadcast.
    pub broadcast_concurrency: usize,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    listen_addr: Option<String>,
    site_url: Option<String>,
    telegram_api_url: Option<String>,
    telegram_timeout_secs: Option<u64>,
    log_dir: Option<String>,
    date_format: Option<String>,
    broadcast_concurrency: Option<usize>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_telegram_timeout_secs() -> u64 {
    5
}

fn default_log_dir() -> String {
    "logs".to_string()
}

pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn validate_date_format(format: String) -> Result<String, ConfigError> {
    if format.is_empty() || StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidDateFormat(format));
    }
    Ok(format)
}

fn default_broadcast_concurrency() -> usize {
    8
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path_str) => read_file_config(Path::new(path_str))?,
            None => PartialServerConfig::default(),
        };
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()?;

        Self::merge(env_config, file_config)
    }

    /// Environment overrides file; defaults fill the rest.
    fn merge(
        env_config: PartialServerConfig,
        file_config: PartialServerConfig,
    ) -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            database_url: env_config
                .database_url
                .or(file_config.database_url)
                .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            jwt_secret: env_config
                .jwt_secret
                .or(file_config.jwt_secret)
                .ok_or(ConfigError::Missing("JWT_SECRET"))?,
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            site_url: env_config
                .site_url
                .or(file_config.site_url)
                .filter(|s| !s.trim().is_empty()),
            telegram_api_url: env_config
                .telegram_api_url
                .or(file_config.telegram_api_url)
                .unwrap_or_else(default_telegram_api_url),
            telegram_timeout_secs: env_config
                .telegram_timeout_secs
                .or(file_config.telegram_timeout_secs)
                .unwrap_or_else(default_telegram_timeout_secs),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            date_format: validate_date_format(
                env_config
                    .date_format
                    .or(file_config.date_format)
                    .unwrap_or_else(default_date_format),
            )?,
            broadcast_concurrency: env_config
                .broadcast_concurrency
                .or(file_config.broadcast_concurrency)
                .filter(|n| *n > 0)
                .unwrap_or_else(default_broadcast_concurrency),
        })
    }

    pub fn telegram_timeout(&self) -> Duration {
        Duration::from_secs(self.telegram_timeout_secs)
    }
}

fn read_file_config(path: &Path) -> Result<PartialServerConfig, ConfigError> {
    if !path.exists() {
        return Ok(PartialServerConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
