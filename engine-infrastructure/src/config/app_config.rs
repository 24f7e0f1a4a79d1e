use std::env;
use std::path::Path;

use anyhow::{bail, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use engine_domain::DetectionConfig;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub detection: DetectionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "warden".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            detection: DetectionConfig::default(),
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("WARDEN_CONFIG").unwrap_or_else(|_| "./warden.toml".to_string());
        let file_path = Path::new(&path);
        if !file_path.exists() {
            warn!("warden.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("WARDEN_CLICKHOUSE_URL") {
            self.clickhouse_url = url;
        }
        if let Ok(database) = env::var("WARDEN_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = database;
        }
        if let Ok(user) = env::var("WARDEN_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(user);
        }
        if let Ok(password) = env::var("WARDEN_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(password);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.clickhouse_url.trim().is_empty() {
            bail!("clickhouse_url must not be empty");
        }
        if self.clickhouse_database.trim().is_empty() {
            bail!("clickhouse_database must not be empty");
        }
        let detection = &self.detection;
        if detection.max_tracked_actions == 0 {
            bail!("max_tracked_actions must be positive");
        }
        if detection.cooldown_ms <= 0 {
            bail!("cooldown_ms must be positive");
        }
        if detection.max_suspicious_events == 0 {
            bail!("max_suspicious_events must be positive");
        }
        if detection.burst_window_ms <= 0 || detection.burst_threshold == 0 {
            bail!("burst window and threshold must be positive");
        }
        if detection.retention_days <= 0 {
            bail!("retention_days must be positive");
        }
        if detection.max_score <= 0.0 {
            bail!("max_score must be positive");
        }
        Ok(())
    }
}
