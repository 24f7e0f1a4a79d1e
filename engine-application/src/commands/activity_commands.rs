use engine_domain::{
    current_millis, millis_to_utc, normalize_user_id, ActionRecord, ActionRow, ActivityStats,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::EngineState;

/// Optional context accompanying a recorded gameplay event.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ActionInput {
    pub game_id: Option<String>,
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Appends one gameplay event to the user's ledger. Never fails: the
/// in-memory append always happens, the durable copy and retention prune
/// are detached best-effort writes.
pub async fn record_action(
    state: &EngineState,
    user_id: &str,
    action_type: &str,
    payload: Option<Value>,
    input: ActionInput,
) {
    let now = current_millis();
    let user_key = normalize_user_id(user_id);

    let entry = state.ledger_entry_or_create(&user_key, now).await;
    {
        let mut activity = entry.lock().await;
        activity.push_action(ActionRecord {
            time_ms: now,
            action_type: action_type.to_string(),
            payload: payload.clone(),
        });
    }
    state.metrics.record_action();

    state.gateway.spawn_action(ActionRow {
        event_time: millis_to_utc(now),
        event_id: Uuid::new_v4().to_string(),
        user_id: user_key,
        game_id: input.game_id.unwrap_or_default(),
        action_type: action_type.to_string(),
        device_id: input.device_id.unwrap_or_default(),
        ip_address: input.ip_address.unwrap_or_default(),
        user_agent: input.user_agent.unwrap_or_default(),
        payload_json: payload.map(|p| p.to_string()).unwrap_or_default(),
    });
    state.gateway.spawn_prune(now - state.config.retention_ms());
}

/// Drops the user's in-memory state entirely (manual remediation).
pub async fn clear_history(state: &EngineState, user_id: &str) {
    let user_key = normalize_user_id(user_id);
    state.ledger.write().await.remove(&user_key);
}

/// Forgives a user: zeroes the strike counter without touching history.
pub async fn reset_suspicious_count(state: &EngineState, user_id: &str) {
    let user_key = normalize_user_id(user_id);
    if let Some(entry) = state.ledger_entry(&user_key).await {
        let mut activity = entry.lock().await;
        activity.suspicious_count = 0;
        activity.last_suspicious_ms = 0;
    }
}

pub async fn get_stats(state: &EngineState, user_id: &str) -> Option<ActivityStats> {
    let user_key = normalize_user_id(user_id);
    let entry = state.ledger_entry(&user_key).await?;
    let activity = entry.lock().await;
    Some(activity.stats(state.config.stats_window_ms, current_millis()))
}
