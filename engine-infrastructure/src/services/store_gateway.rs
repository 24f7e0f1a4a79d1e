// Store gateway
// Detaches durable writes from the decision path. The in-memory engine
// never waits on the store; a dead store costs only the audit trail.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use engine_domain::millis_to_utc;
use engine_domain::ports::{RecordStore, StoreGateway};
use engine_domain::{ActionRow, DeviceRow, IpRow, SuspiciousActivityRow};

pub struct DefaultStoreGateway {
    store: Arc<dyn RecordStore>,
}

impl DefaultStoreGateway {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StoreGateway for DefaultStoreGateway {
    fn spawn_action(&self, row: ActionRow) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if !store.is_available().await {
                debug!("record store unavailable, skipping action append");
                return;
            }
            if let Err(err) = store.append_action(row).await {
                warn!("failed to append action record: {}", err);
            }
        });
    }

    fn spawn_suspicious(&self, row: SuspiciousActivityRow) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if !store.is_available().await {
                debug!("record store unavailable, skipping suspicious append");
                return;
            }
            if let Err(err) = store.append_suspicious(row).await {
                warn!("failed to append suspicious activity: {}", err);
            }
        });
    }

    fn spawn_device_upsert(&self, row: DeviceRow) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(err) = store.upsert_device(row).await {
                warn!("failed to upsert device fingerprint: {}", err);
            }
        });
    }

    fn spawn_ip_upsert(&self, row: IpRow) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(err) = store.upsert_ip(row).await {
                warn!("failed to upsert ip record: {}", err);
            }
        });
    }

    fn spawn_prune(&self, cutoff_ms: i64) {
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(err) = store.prune_actions_older_than(millis_to_utc(cutoff_ms)).await {
                warn!("failed to prune action records: {}", err);
            }
        });
    }

    async fn load_device(&self, fingerprint: &str) -> Option<DeviceRow> {
        match self.store.get_device(fingerprint).await {
            Ok(found) => found,
            Err(err) => {
                warn!("device lookup failed, treating as unknown: {}", err);
                None
            }
        }
    }

    async fn load_ip(&self, address: &str) -> Option<IpRow> {
        match self.store.get_ip(address).await {
            Ok(found) => found,
            Err(err) => {
                warn!("ip lookup failed, treating as unknown: {}", err);
                None
            }
        }
    }

    async fn check_store(&self) -> bool {
        self.store.is_available().await
    }
}
