use async_trait::async_trait;
use clickhouse::Client;
use time::OffsetDateTime;

use engine_domain::ports::{RecordStore, StoreError, StoreResult};
use engine_domain::{ActionRow, DeviceRow, IpRow, SuspiciousActivityRow};

#[derive(Clone)]
pub struct ClickhouseStore {
    client: Client,
    database: String,
}

impl ClickhouseStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client.query(&create_db).execute().await?;

        let create_actions = r#"
CREATE TABLE IF NOT EXISTS action_events (
    event_time DateTime64(3),
    event_id String,
    user_id String,
    game_id String,
    action_type String,
    device_id String,
    ip_address String,
    user_agent String,
    payload_json String
) ENGINE = MergeTree
PARTITION BY toDate(event_time)
ORDER BY (event_time, user_id)
TTL toDateTime(event_time) + INTERVAL 30 DAY
"#;
        self.client.query(create_actions).execute().await?;

        let create_suspicious = r#"
CREATE TABLE IF NOT EXISTS suspicious_activities (
    event_time DateTime64(3),
    user_id String,
    game_id String,
    rule_id String,
    reason String,
    risk_level String,
    confidence Float64,
    device_id String,
    ip_address String,
    blocked Bool
) ENGINE = MergeTree
PARTITION BY toDate(event_time)
ORDER BY (event_time, user_id)
"#;
        self.client.query(create_suspicious).execute().await?;

        let create_devices = r#"
CREATE TABLE IF NOT EXISTS device_fingerprints (
    fingerprint String,
    user_ids Array(String),
    suspicious Bool,
    blocked Bool,
    last_seen DateTime64(3),
    metadata_json String,
    updated_at DateTime64(3)
) ENGINE = ReplacingMergeTree(updated_at)
ORDER BY fingerprint
"#;
        self.client.query(create_devices).execute().await?;

        let create_ips = r#"
CREATE TABLE IF NOT EXISTS ip_records (
    address String,
    user_ids Array(String),
    is_vpn Bool,
    is_proxy Bool,
    is_tor Bool,
    risk_level String,
    suspicious Bool,
    blocked Bool,
    blocked_until_ms Int64,
    last_seen DateTime64(3),
    updated_at DateTime64(3)
) ENGINE = ReplacingMergeTree(updated_at)
ORDER BY address
"#;
        self.client.query(create_ips).execute().await?;
        Ok(())
    }
}

fn backend(err: clickhouse::error::Error) -> StoreError {
    StoreError::Backend(anyhow::Error::new(err))
}

#[async_trait]
impl RecordStore for ClickhouseStore {
    async fn is_available(&self) -> bool {
        self.client
            .query("SELECT toUInt8(1)")
            .fetch_one::<u8>()
            .await
            .is_ok()
    }

    async fn append_action(&self, row: ActionRow) -> StoreResult<()> {
        let mut insert = self.client.insert("action_events").map_err(backend)?;
        insert.write(&row).await.map_err(backend)?;
        insert.end().await.map_err(backend)?;
        Ok(())
    }

    async fn append_suspicious(&self, row: SuspiciousActivityRow) -> StoreResult<()> {
        let mut insert = self
            .client
            .insert("suspicious_activities")
            .map_err(backend)?;
        insert.write(&row).await.map_err(backend)?;
        insert.end().await.map_err(backend)?;
        Ok(())
    }

    async fn upsert_device(&self, row: DeviceRow) -> StoreResult<()> {
        let mut insert = self.client.insert("device_fingerprints").map_err(backend)?;
        insert.write(&row).await.map_err(backend)?;
        insert.end().await.map_err(backend)?;
        Ok(())
    }

    async fn get_device(&self, fingerprint: &str) -> StoreResult<Option<DeviceRow>> {
        self.client
            .query(
                "SELECT ?fields FROM device_fingerprints FINAL \
                 WHERE fingerprint = ? ORDER BY updated_at DESC LIMIT 1",
            )
            .bind(fingerprint)
            .fetch_optional::<DeviceRow>()
            .await
            .map_err(backend)
    }

    async fn upsert_ip(&self, row: IpRow) -> StoreResult<()> {
        let mut insert = self.client.insert("ip_records").map_err(backend)?;
        insert.write(&row).await.map_err(backend)?;
        insert.end().await.map_err(backend)?;
        Ok(())
    }

    async fn get_ip(&self, address: &str) -> StoreResult<Option<IpRow>> {
        self.client
            .query(
                "SELECT ?fields FROM ip_records FINAL \
                 WHERE address = ? ORDER BY updated_at DESC LIMIT 1",
            )
            .bind(address)
            .fetch_optional::<IpRow>()
            .await
            .map_err(backend)
    }

    async fn prune_actions_older_than(&self, cutoff: OffsetDateTime) -> StoreResult<()> {
        self.client
            .query("ALTER TABLE action_events DELETE WHERE event_time < toDateTime64(?, 3)")
            .bind(cutoff.unix_timestamp())
            .execute()
            .await
            .map_err(backend)
    }
}
