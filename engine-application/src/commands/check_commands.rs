use engine_domain::services::detector::{self, ActionContext};
use engine_domain::{current_millis, normalize_token, normalize_user_id, Decision};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::EngineState;

/// Optional caller context for a sensitive-action check.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CheckInput {
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
}

/// Gates a sensitive action (e.g. a reward claim). Consults the
/// reputation registries, then runs the behavioural rule list against the
/// user's ledger; a fired rule is persisted best-effort.
pub async fn check_action(
    state: &EngineState,
    user_id: &str,
    action_type: &str,
    payload: Option<&Value>,
    input: CheckInput,
) -> Decision {
    let now = current_millis();
    state.metrics.record_check();

    let user_key = normalize_user_id(user_id);
    let Some(entry) = state.ledger_entry(&user_key).await else {
        // Nothing recorded yet: no baseline to judge against.
        return Decision::pass();
    };

    let device = match input.device_id.as_deref().map(normalize_token) {
        Some(id) => state.devices.read().await.get(&id).cloned(),
        None => None,
    };
    let ip = match input.ip_address.as_deref().map(normalize_token) {
        Some(addr) => state.ips.read().await.get(&addr).cloned(),
        None => None,
    };

    let outcome = {
        let mut activity = entry.lock().await;
        detector::check_action(
            &mut activity,
            &ActionContext {
                action_type,
                payload,
                device: device.as_ref(),
                ip: ip.as_ref(),
            },
            &state.config,
            now,
        )
    };

    if let Some(rule) = &outcome.fired {
        warn!("suspicious action for {}: {}", user_key, rule.reason);
        state.metrics.record_suspicious();
        state.gateway.spawn_suspicious(rule.to_row(
            &user_key,
            None,
            input.device_id.as_deref(),
            input.ip_address.as_deref(),
            now,
        ));
    }
    if outcome.decision.blocked {
        state.metrics.record_block();
    }
    outcome.decision
}
