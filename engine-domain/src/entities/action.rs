// Action entities
// A single gameplay event kept in the rolling ledger, and its durable row form

use clickhouse::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub time_ms: i64,
    pub action_type: String,
    pub payload: Option<Value>,
}

impl ActionRecord {
    /// True when the payload carries `key: true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.payload.as_ref().and_then(|p| p.get(key)),
            Some(Value::Bool(true))
        )
    }

    /// True when the payload explicitly carries `key: false`.
    pub fn flag_is_false(&self, key: &str) -> bool {
        matches!(
            self.payload.as_ref().and_then(|p| p.get(key)),
            Some(Value::Bool(false))
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct ActionRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub event_time: OffsetDateTime,
    pub event_id: String,
    pub user_id: String,
    pub game_id: String,
    pub action_type: String,
    pub device_id: String,
    pub ip_address: String,
    pub user_agent: String,
    pub payload_json: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_flags() {
        let record = ActionRecord {
            time_ms: 0,
            action_type: "tap".to_string(),
            payload: Some(json!({"perfect": true, "correct": false})),
        };
        assert!(record.flag("perfect"));
        assert!(record.flag_is_false("correct"));
        assert!(!record.flag("correct"));

        let bare = ActionRecord {
            time_ms: 0,
            action_type: "tap".to_string(),
            payload: None,
        };
        assert!(!bare.flag("perfect"));
        assert!(!bare.flag_is_false("correct"));
    }
}
