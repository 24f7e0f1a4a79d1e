use std::sync::Arc;

use anyhow::Result;
use clickhouse::Client;
use tracing::warn;

use engine_application::EngineState;

use crate::{AppConfig, ClickhouseStore, DefaultStoreGateway};

/// Wires configuration, store and engine state for the embedding service.
pub struct EngineContext {
    pub state: EngineState,
}

impl EngineContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        Self::with_config(config).await
    }

    pub async fn with_config(config: AppConfig) -> Result<Self> {
        let mut client = Client::default()
            .with_url(&config.clickhouse_url)
            .with_database(&config.clickhouse_database);
        if let Some(user) = &config.clickhouse_user {
            client = client.with_user(user);
        }
        if let Some(password) = &config.clickhouse_password {
            client = client.with_password(password);
        }

        let store = Arc::new(ClickhouseStore::new(
            client,
            config.clickhouse_database.clone(),
        ));
        // A dead store at startup degrades to in-memory decisions only.
        if let Err(err) = store.ensure_schema().await {
            warn!("record store schema setup failed, continuing without durable audit: {}", err);
        }

        let gateway = Arc::new(DefaultStoreGateway::new(store));
        let state = EngineState::new(config.detection.clone(), gateway);
        Ok(Self { state })
    }
}
