// Escalation policy
// Strike counter plus cooldown window; blocked is permanent until an
// operator reset. The counter never decays on its own.

use crate::entities::{DetectionConfig, UserActivity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    Normal,
    Flagged,
    CoolingDown,
    Blocked,
}

pub fn escalation_state(
    activity: &UserActivity,
    config: &DetectionConfig,
    now_ms: i64,
) -> EscalationState {
    if activity.suspicious_count >= config.max_suspicious_events {
        return EscalationState::Blocked;
    }
    if in_cooldown(activity, config, now_ms) {
        return EscalationState::CoolingDown;
    }
    if activity.suspicious_count > 0 {
        return EscalationState::Flagged;
    }
    EscalationState::Normal
}

pub fn in_cooldown(activity: &UserActivity, config: &DetectionConfig, now_ms: i64) -> bool {
    activity.last_suspicious_ms > 0 && now_ms - activity.last_suspicious_ms < config.cooldown_ms
}

/// Registers a strike. Returns true once the counter reaches the block
/// threshold.
pub fn record_strike(activity: &mut UserActivity, config: &DetectionConfig, now_ms: i64) -> bool {
    activity.suspicious_count += 1;
    activity.last_suspicious_ms = now_ms;
    activity.suspicious_count >= config.max_suspicious_events
}
