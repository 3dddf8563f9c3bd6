use std::path::PathBuf;

use common::StorageAppConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::Level;

/// Runtime mode. Development turns on request logging and debug output.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Development,
    #[default]
    Production,
}

impl AppMode {
    pub fn is_development(self) -> bool {
        self == AppMode::Development
    }

    pub fn log_level(self) -> Level {
        match self {
            AppMode::Development => Level::DEBUG,
            AppMode::Production => Level::INFO,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins. Empty allows any origin.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Requests allowed per client address per window. 0 disables limiting.
    #[serde(default = "default_rate_limit_max")]
    pub max_requests: u32,
    #[serde(default = "default_rate_limit_window")]
    pub window_secs: u64,
    /// Take the client address from the first `X-Forwarded-For` entry.
    /// Only enable behind a proxy that sets it.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Upper bound for a whole multipart request body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Directory served for paths no route matches.
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: AppMode,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageAppConfig,
}

fn default_cors_max_age() -> u64 {
    3600
}
fn default_rate_limit_max() -> u32 {
    1000
}
fn default_rate_limit_window() -> u64 {
    60 * 60
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("public"))
}
fn default_max_connections() -> u32 {
    20
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_rate_limit_max(),
            window_secs: default_rate_limit_window(),
            trust_forwarded_for: false,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., REWASTE__DATABASE__URL)
            .add_source(Environment::with_prefix("REWASTE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
