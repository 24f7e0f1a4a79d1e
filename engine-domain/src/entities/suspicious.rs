// Suspicious activity entities
// A fired rule and the append-only audit row persisted for it

use clickhouse::Row;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::entities::Decision;
use crate::utils::millis_to_utc;
use crate::value_objects::Severity;

/// A detection rule that fired, before it is tied to a user and persisted.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule_id: &'static str,
    pub reason: &'static str,
    pub confidence: f64,
}

impl RuleMatch {
    pub fn severity(&self) -> Severity {
        Severity::from_confidence(self.confidence)
    }

    pub fn decision(&self, blocked: bool) -> Decision {
        Decision {
            suspicious: true,
            reason: Some(self.reason.to_string()),
            confidence: self.confidence,
            blocked,
        }
    }

    pub fn to_row(
        &self,
        user_id: &str,
        game_id: Option<&str>,
        device_id: Option<&str>,
        ip_address: Option<&str>,
        now_ms: i64,
    ) -> SuspiciousActivityRow {
        SuspiciousActivityRow {
            event_time: millis_to_utc(now_ms),
            user_id: user_id.to_string(),
            game_id: game_id.unwrap_or_default().to_string(),
            rule_id: self.rule_id.to_string(),
            reason: self.reason.to_string(),
            risk_level: self.severity().as_str().to_string(),
            confidence: self.confidence,
            device_id: device_id.unwrap_or_default().to_string(),
            ip_address: ip_address.unwrap_or_default().to_string(),
            // The row records whether this single event blocks on its own.
            blocked: self.confidence >= 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct SuspiciousActivityRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub event_time: OffsetDateTime,
    pub user_id: String,
    pub game_id: String,
    pub rule_id: String,
    pub reason: String,
    pub risk_level: String,
    pub confidence: f64,
    pub device_id: String,
    pub ip_address: String,
    pub blocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_carries_severity_and_block_flag() {
        let rule = RuleMatch {
            rule_id: "B2",
            reason: "action burst",
            confidence: 0.9,
        };
        let row = rule.to_row("0xabc", Some("game-1"), None, Some("203.0.113.9"), 1_000);
        assert_eq!(row.rule_id, "B2");
        assert_eq!(row.risk_level, "HIGH");
        assert!(row.blocked);
        assert_eq!(row.game_id, "game-1");
        assert_eq!(row.device_id, "");

        let softer = RuleMatch {
            rule_id: "B4",
            reason: "implausible perfect streak",
            confidence: 0.85,
        };
        assert!(!softer.to_row("0xabc", None, None, None, 1_000).blocked);
    }
}
