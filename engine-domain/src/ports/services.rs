use async_trait::async_trait;

use crate::entities::{ActionRow, DeviceRow, IpRow, SuspiciousActivityRow};

/// Fire-and-forget facade over the record store. Writes run as detached
/// tasks; failures surface only in the log, never to the decision path.
#[async_trait]
pub trait StoreGateway: Send + Sync {
    fn spawn_action(&self, row: ActionRow);
    fn spawn_suspicious(&self, row: SuspiciousActivityRow);
    fn spawn_device_upsert(&self, row: DeviceRow);
    fn spawn_ip_upsert(&self, row: IpRow);
    fn spawn_prune(&self, cutoff_ms: i64);
    /// Best-effort durable lookup; any store fault reads as "no information".
    async fn load_device(&self, fingerprint: &str) -> Option<DeviceRow>;
    async fn load_ip(&self, address: &str) -> Option<IpRow>;
    async fn check_store(&self) -> bool;
}
