use engine_domain::services::registry::multi_account_match;
use engine_domain::{
    current_millis, normalize_token, normalize_user_id, DeviceRecord, IpRecord, IpRiskInfo,
};
use serde_json::Value;
use tracing::warn;

use crate::EngineState;

/// Records a device sighting. Unions the account into the fingerprint's
/// set; the registration that pushes the set past the share limit emits
/// exactly one multi-account audit row.
pub async fn register_device(
    state: &EngineState,
    fingerprint: &str,
    user_id: &str,
    metadata: Option<Value>,
) {
    let fingerprint = normalize_token(fingerprint);
    if fingerprint.is_empty() {
        return;
    }
    let now = current_millis();
    let user_key = normalize_user_id(user_id);

    // Cold start: pull whatever the store remembers before merging.
    let known = state.devices.read().await.get(&fingerprint).is_some();
    let stored = if known {
        None
    } else {
        state.gateway.load_device(&fingerprint).await
    };

    let outcome = {
        let mut devices = state.devices.write().await;
        if let Some(row) = stored {
            devices.hydrate(DeviceRecord::from_row(row));
        }
        devices.register(
            &fingerprint,
            &user_key,
            metadata,
            state.config.shared_user_limit,
            now,
        )
    };

    if outcome.crossed_share_limit {
        warn!(
            "device {} now shared by {} accounts",
            fingerprint,
            outcome.record.user_ids.len()
        );
        state.metrics.record_suspicious();
        state.gateway.spawn_suspicious(multi_account_match().to_row(
            &user_key,
            None,
            Some(&fingerprint),
            None,
            now,
        ));
    }
    state.gateway.spawn_device_upsert(outcome.record.to_row(now));
}

/// Records a network-address sighting, merging any reputation result the
/// caller obtained. Anonymizer indications auto-block the address.
pub async fn register_ip(
    state: &EngineState,
    address: &str,
    user_id: &str,
    risk: Option<IpRiskInfo>,
) {
    let address = normalize_token(address);
    if address.is_empty() {
        return;
    }
    let now = current_millis();
    let user_key = normalize_user_id(user_id);
    if risk.is_some_and(|info| info.anonymizer()) {
        warn!("anonymizer indication for address {}", address);
    }

    let known = state.ips.read().await.get(&address).is_some();
    let stored = if known {
        None
    } else {
        state.gateway.load_ip(&address).await
    };

    let outcome = {
        let mut ips = state.ips.write().await;
        if let Some(row) = stored {
            ips.hydrate(IpRecord::from_row(row));
        }
        ips.register(
            &address,
            &user_key,
            risk,
            state.config.shared_user_limit,
            state.config.ip_block_ms(),
            now,
        )
    };

    state.gateway.spawn_ip_upsert(outcome.record.to_row(now));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::state_with_recorder;

    #[tokio::test]
    async fn fourth_account_on_a_device_emits_one_audit_row() {
        let (state, recorder) = state_with_recorder();
        for user in ["0xa", "0xb", "0xc", "0xD", "0xe"] {
            register_device(&state, "fp-1", user, None).await;
        }
        let rows = recorder.suspicious.lock().expect("lock");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rule_id, "M1");
        assert_eq!(rows[0].device_id, "fp-1");
        // The emitting registration belongs to the fourth account.
        assert_eq!(rows[0].user_id, "0xd");

        let devices = recorder.devices.lock().expect("lock");
        assert_eq!(devices.len(), 5);
        assert!(devices.last().expect("row").suspicious);
    }

    #[tokio::test]
    async fn vpn_address_is_blocked_for_a_day() {
        let (state, recorder) = state_with_recorder();
        let before = current_millis();
        register_ip(
            &state,
            "203.0.113.9",
            "0xabc",
            Some(IpRiskInfo {
                is_vpn: true,
                ..Default::default()
            }),
        )
        .await;
        let after = current_millis();

        let rows = recorder.ips.lock().expect("lock");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].blocked);
        let until = rows[0].blocked_until_ms;
        assert!(until >= before + 24 * 3_600_000);
        assert!(until <= after + 24 * 3_600_000);
    }

    #[tokio::test]
    async fn blank_fingerprint_is_ignored(){
        let (state, recorder) = state_with_recorder();
        register_device(&state, "   ", "0xabc", None).await;
        assert!(recorder.devices.lock().expect("lock").is_empty());
    }
}
