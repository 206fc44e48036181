use crate::constants;
use crate::error::{IngestError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub clickhouse: ClickHouseConfig,
}

/// Destination connection settings, passed explicitly into the store.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickHouseConfig {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    #[serde(default = "default_secure")]
    pub secure: bool,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_secure() -> bool {
    true
}

fn default_table() -> String {
    constants::DEFAULT_TABLE.to_string()
}

impl Config {
    /// Loads from config.toml when present, otherwise from CLICKHOUSE_* environment variables.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        if Path::new(config_path).exists() {
            let config_content = fs::read_to_string(config_path).map_err(|e| {
                IngestError::Config(format!("Failed to read config file '{}': {}", config_path, e))
            })?;

            let config: Config = toml::from_str(&config_content)?;
            Ok(config)
        } else {
            Ok(Self {
                clickhouse: ClickHouseConfig::from_env()?,
            })
        }
    }
}

impl ClickHouseConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("CLICKHOUSE_HOST")
            .map_err(|_| IngestError::Config("CLICKHOUSE_HOST is not set".to_string()))?;
        let user = env::var("CLICKHOUSE_USER")
            .map_err(|_| IngestError::Config("CLICKHOUSE_USER is not set".to_string()))?;
        let password = env::var("CLICKHOUSE_PASSWORD")
            .map_err(|_| IngestError::Config("CLICKHOUSE_PASSWORD is not set".to_string()))?;
        let secure = env::var("CLICKHOUSE_SECURE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);
        let port = env::var("CLICKHOUSE_PORT").ok().and_then(|v| v.parse().ok());
        let table =
            env::var("CLICKHOUSE_TABLE").unwrap_or_else(|_| constants::DEFAULT_TABLE.to_string());

        Ok(Self {
            host,
            port,
            user,
            password,
            secure,
            table,
        })
    }
}
