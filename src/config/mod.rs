use serde::Deserialize;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

// Главная структура конфигурации
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

impl AppConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout_seconds: u64,
}

/// Разбирает значение переменной окружения, `raw = None` означает "не задана".
fn parse_or<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = raw.unwrap_or_else(|| default.to_string());
    value.parse().map_err(|_| ConfigError::Invalid { name, expected, value })
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            app: AppConfig {
                host: parse_or("HOST", var("HOST"), "0.0.0.0", "IP address")?,
                port: parse_or("PORT", var("PORT"), "8000", "port number")?,
                environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
                rust_log: var("RUST_LOG")
                    .unwrap_or_else(|| "cinema_booking=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                pool_size: parse_or("DB_POOL_SIZE", var("DB_POOL_SIZE"), "20", "number")?,
                acquire_timeout_seconds: parse_or(
                    "DB_ACQUIRE_TIMEOUT_SECONDS",
                    var("DB_ACQUIRE_TIMEOUT_SECONDS"),
                    "5",
                    "number",
                )?,
            },
        })
    }
}
