// Device fingerprint entity
// Cross-references the accounts seen behind one device token

use std::collections::BTreeSet;

use clickhouse::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::utils::{millis_to_utc, utc_to_millis};

#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub fingerprint: String,
    pub user_ids: BTreeSet<String>,
    pub suspicious: bool,
    pub blocked: bool,
    pub last_seen_ms: i64,
    pub metadata: Option<Value>,
}

impl DeviceRecord {
    pub fn new(fingerprint: &str, now_ms: i64) -> Self {
        Self {
            fingerprint: fingerprint.to_string(),
            user_ids: BTreeSet::new(),
            suspicious: false,
            blocked: false,
            last_seen_ms: now_ms,
            metadata: None,
        }
    }

    pub fn to_row(&self, now_ms: i64) -> DeviceRow {
        DeviceRow {
            fingerprint: self.fingerprint.clone(),
            user_ids: self.user_ids.iter().cloned().collect(),
            suspicious: self.suspicious,
            blocked: self.blocked,
            last_seen: millis_to_utc(self.last_seen_ms),
            metadata_json: self
                .metadata
                .as_ref()
                .map(|meta| meta.to_string())
                .unwrap_or_default(),
            updated_at: millis_to_utc(now_ms),
        }
    }

    pub fn from_row(row: DeviceRow) -> Self {
        Self {
            fingerprint: row.fingerprint,
            user_ids: row.user_ids.into_iter().collect(),
            suspicious: row.suspicious,
            blocked: row.blocked,
            last_seen_ms: utc_to_millis(row.last_seen),
            metadata: serde_json::from_str(&row.metadata_json).ok(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct DeviceRow {
    pub fingerprint: String,
    pub user_ids: Vec<String>,
    pub suspicious: bool,
    pub blocked: bool,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub last_seen: OffsetDateTime,
    pub metadata_json: String,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_round_trip() {
        let mut record = DeviceRecord::new("fp-1", 1_000);
        record.user_ids.insert("0xaaa".to_string());
        record.suspicious = true;
        record.metadata = Some(json!({"os": "linux"}));

        let restored = DeviceRecord::from_row(record.to_row(2_000));
        assert_eq!(restored.fingerprint, "fp-1");
        assert!(restored.user_ids.contains("0xaaa"));
        assert!(restored.suspicious);
        assert_eq!(restored.last_seen_ms, 1_000);
        assert_eq!(restored.metadata, Some(json!({"os": "linux"})));
    }
}
