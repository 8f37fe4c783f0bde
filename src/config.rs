use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub auth: AuthConfig,
    /// Durable audit store (also holds the `users` table)
    pub analytics: DatabaseConfig,
    /// Legacy order-processing store
    pub legacy: LegacyConfig,
    pub crm: CrmConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_minutes: i64,
}

fn default_token_lifetime() -> i64 {
    60
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_minutes: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
}

impl DatabaseConfig {
    /// Pool settings at their defaults
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: 0,
            acquire_timeout_secs: default_acquire_timeout(),
            max_lifetime_minutes: default_max_lifetime(),
            idle_timeout_minutes: default_idle_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_max_lifetime() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    10
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LegacyConfig {
    #[serde(flatten)]
    pub database: DatabaseConfig,
    /// Stored procedure receiving booking parameter sets
    pub procedure: String,
    /// Deadline for one procedure call
    #[serde(default = "default_legacy_timeout")]
    pub timeout_secs: u64,
}

fn default_legacy_timeout() -> u64 {
    5
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CrmConfig {
    pub url: String,
    #[serde(default = "default_crm_timeout")]
    pub timeout_secs: u64,
}

fn default_crm_timeout() -> u64 {
    5
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;

        if let Ok(secret) = std::env::var("JWT_SECRET")
            && !secret.is_empty()
        {
            config.auth.jwt_secret = secret;
        }
        anyhow::ensure!(
            !config.auth.jwt_secret.is_empty(),
            "auth.jwt_secret is empty; set it in {} or via JWT_SECRET",
            config_path
        );

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}
