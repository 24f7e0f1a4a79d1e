// Reputation registries
// Device fingerprints and network addresses, each mapping to the set of
// accounts seen behind them. The cross-reference is what surfaces
// multi-accounting.

use std::collections::HashMap;

use serde_json::Value;

use crate::entities::{DeviceRecord, IpRecord, IpRiskInfo, RuleMatch};
use crate::value_objects::RiskLevel;

#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, DeviceRecord>,
}

#[derive(Debug)]
pub struct DeviceRegisterOutcome {
    pub record: DeviceRecord,
    /// Set on the exact registration that pushes the account set past the
    /// share limit.
    pub crossed_share_limit: bool,
}

impl DeviceRegistry {
    pub fn get(&self, fingerprint: &str) -> Option<&DeviceRecord> {
        self.devices.get(fingerprint)
    }

    /// Seeds a record restored from the durable store; an existing
    /// in-memory record wins.
    pub fn hydrate(&mut self, record: DeviceRecord) {
        self.devices
            .entry(record.fingerprint.clone())
            .or_insert(record);
    }

    pub fn register(
        &mut self,
        fingerprint: &str,
        user_id: &str,
        metadata: Option<Value>,
        share_limit: usize,
        now_ms: i64,
    ) -> DeviceRegisterOutcome {
        let record = self
            .devices
            .entry(fingerprint.to_string())
            .or_insert_with(|| DeviceRecord::new(fingerprint, now_ms));
        let seen_before = record.user_ids.len();
        record.user_ids.insert(user_id.to_string());
        record.last_seen_ms = now_ms;
        if let Some(metadata) = metadata {
            record.metadata = Some(metadata);
        }
        let crossed_share_limit =
            seen_before <= share_limit && record.user_ids.len() > share_limit;
        record.suspicious = record.suspicious || record.user_ids.len() > share_limit;
        DeviceRegisterOutcome {
            record: record.clone(),
            crossed_share_limit,
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// The audit fact emitted when a device crosses the share limit.
pub fn multi_account_match() -> RuleMatch {
    RuleMatch {
        rule_id: "M1",
        reason: "multiple accounts on one device",
        confidence: 0.9,
    }
}

#[derive(Debug, Default)]
pub struct IpRegistry {
    addresses: HashMap<String, IpRecord>,
}

#[derive(Debug)]
pub struct IpRegisterOutcome {
    pub record: IpRecord,
}

impl IpRegistry {
    pub fn get(&self, address: &str) -> Option<&IpRecord> {
        self.addresses.get(address)
    }

    pub fn hydrate(&mut self, record: IpRecord) {
        self.addresses.entry(record.address.clone()).or_insert(record);
    }

    pub fn register(
        &mut self,
        address: &str,
        user_id: &str,
        risk: Option<IpRiskInfo>,
        share_limit: usize,
        block_ms: i64,
        now_ms: i64,
    ) -> IpRegisterOutcome {
        let record = self
            .addresses
            .entry(address.to_string())
            .or_insert_with(|| IpRecord::new(address, now_ms));
        record.user_ids.insert(user_id.to_string());
        record.last_seen_ms = now_ms;
        if let Some(info) = risk {
            record.is_vpn |= info.is_vpn;
            record.is_proxy |= info.is_proxy;
            record.is_tor |= info.is_tor;
            // Risk only merges upward; a later benign lookup never
            // launders a high-risk address.
            record.risk_level = record.risk_level.max(info.risk_level);
        }
        if record.anonymizer_seen() {
            record.blocked = true;
            record.blocked_until_ms = Some(now_ms + block_ms);
        }
        record.suspicious = record.suspicious
            || record.user_ids.len() > share_limit
            || record.risk_level == RiskLevel::High;
        IpRegisterOutcome {
            record: record.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LIMIT: usize = 3;
    const BLOCK_MS: i64 = 24 * 3_600_000;

    #[test]
    fn device_crosses_share_limit_exactly_once() {
        let mut registry = DeviceRegistry::default();
        for (i, user) in ["0xa", "0xb", "0xc"].iter().enumerate() {
            let outcome = registry.register("fp-1", user, None, LIMIT, i as i64);
            assert!(!outcome.crossed_share_limit);
            assert!(!outcome.record.suspicious);
        }
        let outcome = registry.register("fp-1", "0xd", None, LIMIT, 100);
        assert!(outcome.crossed_share_limit);
        assert!(outcome.record.suspicious);
        assert_eq!(outcome.record.user_ids.len(), 4);

        // Further registrations stay suspicious but never re-emit.
        let outcome = registry.register("fp-1", "0xe", None, LIMIT, 200);
        assert!(!outcome.crossed_share_limit);
        assert!(outcome.record.suspicious);
    }

    #[test]
    fn repeated_registration_is_idempotent() {
        let mut registry = DeviceRegistry::default();
        registry.register("fp-1", "0xa", Some(json!({"os": "linux"})), LIMIT, 0);
        let outcome = registry.register("fp-1", "0xa", Some(json!({"os": "linux"})), LIMIT, 50);
        assert!(!outcome.crossed_share_limit);
        assert_eq!(outcome.record.user_ids.len(), 1);
        assert_eq!(outcome.record.last_seen_ms, 50);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn hydrate_never_overwrites_live_state() {
        let mut registry = DeviceRegistry::default();
        registry.register("fp-1", "0xa", None, LIMIT, 0);
        let mut stale = DeviceRecord::new("fp-1", 0);
        stale.blocked = true;
        registry.hydrate(stale);
        assert!(!registry.get("fp-1").expect("record").blocked);
    }

    #[test]
    fn vpn_indication_blocks_for_a_day() {
        let mut registry = IpRegistry::default();
        let outcome = registry.register(
            "203.0.113.9",
            "0xa",
            Some(IpRiskInfo {
                is_vpn: true,
                ..Default::default()
            }),
            LIMIT,
            BLOCK_MS,
            1_000,
        );
        assert!(outcome.record.blocked);
        assert_eq!(outcome.record.blocked_until_ms, Some(1_000 + BLOCK_MS));

        // The merged record still indicates a VPN, so a later sighting
        // with no fresh risk info re-arms the block window.
        let outcome = registry.register("203.0.113.9", "0xa", None, LIMIT, BLOCK_MS, 2_000);
        assert!(outcome.record.is_vpn);
        assert!(outcome.record.blocked);
        assert_eq!(outcome.record.blocked_until_ms, Some(2_000 + BLOCK_MS));
    }

    #[test]
    fn risk_level_never_downgrades() {
        let mut registry = IpRegistry::default();
        registry.register(
            "203.0.113.9",
            "0xa",
            Some(IpRiskInfo {
                risk_level: RiskLevel::High,
                ..Default::default()
            }),
            LIMIT,
            BLOCK_MS,
            0,
        );
        let outcome = registry.register(
            "203.0.113.9",
            "0xa",
            Some(IpRiskInfo {
                risk_level: RiskLevel::Low,
                ..Default::default()
            }),
            LIMIT,
            BLOCK_MS,
            100,
        );
        assert_eq!(outcome.record.risk_level, RiskLevel::High);
        assert!(outcome.record.suspicious);
    }

    #[test]
    fn shared_address_turns_suspicious() {
        let mut registry = IpRegistry::default();
        for user in ["0xa", "0xb", "0xc"] {
            let outcome = registry.register("198.51.100.7", user, None, LIMIT, BLOCK_MS, 0);
            assert!(!outcome.record.suspicious);
        }
        let outcome = registry.register("198.51.100.7", "0xd", None, LIMIT, BLOCK_MS, 0);
        assert!(outcome.record.suspicious);
        assert!(!outcome.record.blocked);
    }
}
