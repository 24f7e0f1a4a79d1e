use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::entities::{ActionRow, DeviceRow, IpRow, SuspiciousActivityRow};

/// Failure of the durable record store. Callers degrade to the in-memory
/// path; a store failure never changes a decision.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable")]
    Unavailable,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn is_available(&self) -> bool;
    async fn append_action(&self, row: ActionRow) -> StoreResult<()>;
    async fn append_suspicious(&self, row: SuspiciousActivityRow) -> StoreResult<()>;
    async fn upsert_device(&self, row: DeviceRow) -> StoreResult<()>;
    async fn get_device(&self, fingerprint: &str) -> StoreResult<Option<DeviceRow>>;
    async fn upsert_ip(&self, row: IpRow) -> StoreResult<()>;
    async fn get_ip(&self, address: &str) -> StoreResult<Option<IpRow>>;
    async fn prune_actions_older_than(&self, cutoff: OffsetDateTime) -> StoreResult<()>;
}
