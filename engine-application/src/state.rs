use std::collections::HashMap;
use std::sync::Arc;

use engine_domain::ports::StoreGateway;
use engine_domain::services::{DeviceRegistry, IpRegistry};
use engine_domain::{DetectionConfig, UserActivity};
use tokio::sync::{Mutex, RwLock};

use crate::Metrics;

/// Shared engine state. Each ledger entry carries its own lock so
/// concurrent requests for different users never contend.
#[derive(Clone)]
pub struct EngineState {
    pub config: DetectionConfig,
    pub gateway: Arc<dyn StoreGateway>,
    pub ledger: Arc<RwLock<HashMap<String, Arc<Mutex<UserActivity>>>>>,
    pub devices: Arc<RwLock<DeviceRegistry>>,
    pub ips: Arc<RwLock<IpRegistry>>,
    pub metrics: Arc<Metrics>,
}

impl EngineState {
    pub fn new(config: DetectionConfig, gateway: Arc<dyn StoreGateway>) -> Self {
        Self {
            config,
            gateway,
            ledger: Arc::new(RwLock::new(HashMap::new())),
            devices: Arc::new(RwLock::new(DeviceRegistry::default())),
            ips: Arc::new(RwLock::new(IpRegistry::default())),
            metrics: Arc::new(Metrics::default()),
        }
    }

    pub(crate) async fn ledger_entry(&self, user_key: &str) -> Option<Arc<Mutex<UserActivity>>> {
        self.ledger.read().await.get(user_key).cloned()
    }

    pub(crate) async fn ledger_entry_or_create(
        &self,
        user_key: &str,
        now_ms: i64,
    ) -> Arc<Mutex<UserActivity>> {
        if let Some(entry) = self.ledger_entry(user_key).await {
            return entry;
        }
        let mut ledger = self.ledger.write().await;
        ledger
            .entry(user_key.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(UserActivity::new(
                    now_ms,
                    self.config.max_tracked_actions,
                )))
            })
            .clone()
    }
}
