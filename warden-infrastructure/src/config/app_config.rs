use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use warden_domain::{DbConfig, RuntimeConfig};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub profiles_dir: String,
    pub memory_max_players: usize,
    pub memory_ttl_secs: u64,
    pub warm_ttl_secs: u64,
    pub lookback_secs: u64,
    pub lookback_limit: usize,
    pub notify_min_severity: f64,
    pub ml_probability_threshold: f64,
    pub plugin_timeout_ms: u64,
    pub ml_timeout_ms: u64,
    pub severe_override_enabled: bool,
    pub severe_override_count: usize,
    pub severe_override_min_severity: f64,
    pub severe_override_window_secs: u64,
    pub sweep_interval_secs: u64,
    pub persist_retry_max_attempts: u32,
    pub persist_retry_base_ms: u64,
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "warden".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            profiles_dir: "./profiles".to_string(),
            memory_max_players: 10_000,
            memory_ttl_secs: 1_800,
            warm_ttl_secs: 21_600,
            lookback_secs: 3_600,
            lookback_limit: 100,
            notify_min_severity: 4.0,
            ml_probability_threshold: 0.8,
            plugin_timeout_ms: 250,
            ml_timeout_ms: 250,
            severe_override_enabled: true,
            severe_override_count: 3,
            severe_override_min_severity: 4.0,
            severe_override_window_secs: 3_600,
            sweep_interval_secs: 60,
            persist_retry_max_attempts: 5,
            persist_retry_base_ms: 200,
            webhook_url: None,
            webhook_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("WARDEN_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.resolve_paths(base_dir);
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(user) = &self.clickhouse_user {
            if user.trim().is_empty() {
                self.clickhouse_user = None;
            }
        }
        if let Some(password) = &self.clickhouse_password {
            if password.trim().is_empty() {
                self.clickhouse_password = None;
            }
        }
        if let Some(webhook_url) = &self.webhook_url {
            if webhook_url.trim().is_empty() {
                self.webhook_url = None;
            }
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        let path = Path::new(&self.profiles_dir);
        if path.is_relative() && !base.as_os_str().is_empty() {
            self.profiles_dir = base.join(path).to_string_lossy().into_owned();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.clickhouse_url.trim().is_empty() {
            return Err(anyhow!("clickhouse_url must not be empty"));
        }
        if self.memory_max_players == 0 {
            return Err(anyhow!("memory_max_players must be greater than 0"));
        }
        if self.lookback_limit == 0 {
            return Err(anyhow!("lookback_limit must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.ml_probability_threshold) {
            return Err(anyhow!("ml_probability_threshold must be within [0, 1]"));
        }
        if !(0.0..=5.0).contains(&self.notify_min_severity) {
            return Err(anyhow!("notify_min_severity must be within [0, 5]"));
        }
        if self.persist_retry_max_attempts == 0 {
            return Err(anyhow!("persist_retry_max_attempts must be at least 1"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(anyhow!("sweep_interval_secs must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            memory_max_players: self.memory_max_players,
            memory_ttl_secs: self.memory_ttl_secs,
            warm_ttl_secs: self.warm_ttl_secs,
            lookback_secs: self.lookback_secs,
            lookback_limit: self.lookback_limit,
            notify_min_severity: self.notify_min_severity,
            ml_probability_threshold: self.ml_probability_threshold,
            plugin_timeout_ms: self.plugin_timeout_ms,
            ml_timeout_ms: self.ml_timeout_ms,
            severe_override_enabled: self.severe_override_enabled,
            severe_override_count: self.severe_override_count,
            severe_override_min_severity: self.severe_override_min_severity,
            severe_override_window_secs: self.severe_override_window_secs,
            sweep_interval_secs: self.sweep_interval_secs,
            profiles_dir: self.profiles_dir.clone(),
            persist_retry_max_attempts: self.persist_retry_max_attempts,
            persist_retry_base_ms: self.persist_retry_base_ms,
            webhook_url: self.webhook_url.clone(),
            webhook_timeout_secs: self.webhook_timeout_secs,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("WARDEN_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Ok(value) = env::var("WARDEN_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Ok(value) = env::var("WARDEN_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Ok(value) = env::var("WARDEN_PROFILES_DIR") {
            self.profiles_dir = value;
        }
        if let Ok(value) = env::var("WARDEN_WEBHOOK_URL") {
            self.webhook_url = Some(value);
        }
    }
}
