// Network address entity
// Cross-references accounts behind one address plus its reputation flags

use std::collections::BTreeSet;

use clickhouse::Row;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::utils::{millis_to_utc, utc_to_millis};
use crate::value_objects::RiskLevel;

/// Result shape consumed from the external reputation provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IpRiskInfo {
    pub is_vpn: bool,
    pub is_proxy: bool,
    pub is_tor: bool,
    pub risk_level: RiskLevel,
}

impl IpRiskInfo {
    /// VPN, proxy and Tor exits all get the same treatment.
    pub fn anonymizer(&self) -> bool {
        self.is_vpn || self.is_proxy || self.is_tor
    }
}

#[derive(Debug, Clone)]
pub struct IpRecord {
    pub address: String,
    pub user_ids: BTreeSet<String>,
    pub is_vpn: bool,
    pub is_proxy: bool,
    pub is_tor: bool,
    pub risk_level: RiskLevel,
    pub suspicious: bool,
    pub blocked: bool,
    pub blocked_until_ms: Option<i64>,
    pub last_seen_ms: i64,
}

impl IpRecord {
    pub fn new(address: &str, now_ms: i64) -> Self {
        Self {
            address: address.to_string(),
            user_ids: BTreeSet::new(),
            is_vpn: false,
            is_proxy: false,
            is_tor: false,
            risk_level: RiskLevel::Low,
            suspicious: false,
            blocked: false,
            blocked_until_ms: None,
            last_seen_ms: now_ms,
        }
    }

    /// A block with no expiry stands until an operator clears it.
    pub fn is_block_active(&self, now_ms: i64) -> bool {
        self.blocked && self.blocked_until_ms.map_or(true, |until| now_ms < until)
    }

    pub fn anonymizer_seen(&self) -> bool {
        self.is_vpn || self.is_proxy || self.is_tor
    }

    pub fn to_row(&self, now_ms: i64) -> IpRow {
        IpRow {
            address: self.address.clone(),
            user_ids: self.user_ids.iter().cloned().collect(),
            is_vpn: self.is_vpn,
            is_proxy: self.is_proxy,
            is_tor: self.is_tor,
            risk_level: self.risk_level.as_str().to_string(),
            suspicious: self.suspicious,
            blocked: self.blocked,
            blocked_until_ms: self.blocked_until_ms.unwrap_or_default(),
            last_seen: millis_to_utc(self.last_seen_ms),
            updated_at: millis_to_utc(now_ms),
        }
    }

    pub fn from_row(row: IpRow) -> Self {
        Self {
            address: row.address,
            user_ids: row.user_ids.into_iter().collect(),
            is_vpn: row.is_vpn,
            is_proxy: row.is_proxy,
            is_tor: row.is_tor,
            risk_level: RiskLevel::from(row.risk_level.as_str()),
            suspicious: row.suspicious,
            blocked: row.blocked,
            blocked_until_ms: (row.blocked_until_ms > 0).then_some(row.blocked_until_ms),
            last_seen_ms: utc_to_millis(row.last_seen),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
pub struct IpRow {
    pub address: String,
    pub user_ids: Vec<String>,
    pub is_vpn: bool,
    pub is_proxy: bool,
    pub is_tor: bool,
    pub risk_level: String,
    pub suspicious: bool,
    pub blocked: bool,
    /// 0 when no expiry is set.
    pub blocked_until_ms: i64,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub last_seen: OffsetDateTime,
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_window_expires() {
        let mut record = IpRecord::new("203.0.113.9", 0);
        record.blocked = true;
        record.blocked_until_ms = Some(10_000);
        assert!(record.is_block_active(9_999));
        assert!(!record.is_block_active(10_000));

        record.blocked_until_ms = None;
        assert!(record.is_block_active(i64::MAX));
    }

    #[test]
    fn row_round_trip() {
        let mut record = IpRecord::new("203.0.113.9", 5_000);
        record.user_ids.insert("0xbbb".to_string());
        record.is_vpn = true;
        record.risk_level = RiskLevel::High;
        record.blocked = true;
        record.blocked_until_ms = Some(90_000);

        let restored = IpRecord::from_row(record.to_row(6_000));
        assert_eq!(restored.address, "203.0.113.9");
        assert!(restored.is_vpn);
        assert_eq!(restored.risk_level, RiskLevel::High);
        assert_eq!(restored.blocked_until_ms, Some(90_000));
        assert_eq!(restored.last_seen_ms, 5_000);
    }
}
