// Suspicion detector
// Ordered decision list over the user's ledger and the reputation
// registries. The order is load-bearing: the first match wins, and the
// reputation and escalation gates run before any behavioural rule.

use serde_json::Value;

use crate::entities::{
    Decision, DetectionConfig, DeviceRecord, IpRecord, RuleMatch, UserActivity,
};
use crate::services::escalation;
use crate::value_objects::RiskLevel;

/// Caller-supplied context for a sensitive-action check.
#[derive(Debug, Default)]
pub struct ActionContext<'a> {
    pub action_type: &'a str,
    pub payload: Option<&'a Value>,
    pub device: Option<&'a DeviceRecord>,
    pub ip: Option<&'a IpRecord>,
}

/// The outward decision plus the audit fact to persist when a behavioural
/// rule fired. Reputation and escalation gates never produce an audit fact.
#[derive(Debug)]
pub struct CheckOutcome {
    pub decision: Decision,
    pub fired: Option<RuleMatch>,
}

impl CheckOutcome {
    pub fn decided(decision: Decision) -> Self {
        Self {
            decision,
            fired: None,
        }
    }
}

pub fn check_action(
    activity: &mut UserActivity,
    ctx: &ActionContext<'_>,
    config: &DetectionConfig,
    now_ms: i64,
) -> CheckOutcome {
    if let Some(device) = ctx.device {
        if device.blocked {
            return CheckOutcome::decided(Decision::deny("device blocked", 1.0));
        }
        if device.suspicious && device.user_ids.len() > config.shared_user_limit {
            return CheckOutcome::decided(Decision::deny(
                "device shared by too many accounts",
                0.9,
            ));
        }
    }

    if let Some(ip) = ctx.ip {
        if ip.is_block_active(now_ms) {
            return CheckOutcome::decided(Decision::deny("ip address blocked", 1.0));
        }
        if ip.suspicious && ip.risk_level == RiskLevel::High {
            return CheckOutcome::decided(Decision::flag("high risk ip address", 0.85));
        }
    }

    if escalation::in_cooldown(activity, config, now_ms) {
        return CheckOutcome::decided(Decision::deny("suspicious cooldown", 0.95));
    }

    if activity.suspicious_count >= config.max_suspicious_events {
        return CheckOutcome::decided(Decision::deny("too many suspicious events", 1.0));
    }

    match behavioural_match(activity, ctx, config, now_ms) {
        Some(rule) => {
            let blocked = escalation::record_strike(activity, config, now_ms);
            let decision = rule.decision(blocked);
            CheckOutcome {
                decision,
                fired: Some(rule),
            }
        }
        None => CheckOutcome::decided(Decision::pass()),
    }
}

fn behavioural_match(
    activity: &UserActivity,
    ctx: &ActionContext<'_>,
    config: &DetectionConfig,
    now_ms: i64,
) -> Option<RuleMatch> {
    speed_violation(activity, config, now_ms)
        .or_else(|| burst_violation(activity, config, now_ms))
        .or_else(|| repetitive_pattern(activity, config))
        .or_else(|| perfect_streak(activity, ctx.payload, config))
        .or_else(|| machine_timing(activity, config))
        .or_else(|| rapid_state_changes(activity, config))
}

fn speed_violation(
    activity: &UserActivity,
    config: &DetectionConfig,
    now_ms: i64,
) -> Option<RuleMatch> {
    let last = activity.last()?;
    if now_ms - last.time_ms < config.min_action_interval_ms {
        return Some(RuleMatch {
            rule_id: "B1",
            reason: "action interval below human threshold",
            confidence: 0.95,
        });
    }
    None
}

fn burst_violation(
    activity: &UserActivity,
    config: &DetectionConfig,
    now_ms: i64,
) -> Option<RuleMatch> {
    if activity.count_since(now_ms - config.burst_window_ms) >= config.burst_threshold {
        return Some(RuleMatch {
            rule_id: "B2",
            reason: "action burst",
            confidence: 0.9,
        });
    }
    None
}

fn repetitive_pattern(activity: &UserActivity, config: &DetectionConfig) -> Option<RuleMatch> {
    if activity.len() < config.pattern_window {
        return None;
    }
    let recent = activity.recent(config.pattern_window);
    let first_type = &recent[0].action_type;
    if !recent.iter().all(|record| record.action_type == *first_type) {
        return None;
    }
    let intervals: Vec<f64> = activity
        .intervals_of_last(config.pattern_window)
        .into_iter()
        .map(|interval| interval as f64)
        .collect();
    if variance(&intervals) < config.pattern_variance_ms2 {
        return Some(RuleMatch {
            rule_id: "B3",
            reason: "repetitive action pattern",
            confidence: 0.9,
        });
    }
    None
}

fn perfect_streak(
    activity: &UserActivity,
    payload: Option<&Value>,
    config: &DetectionConfig,
) -> Option<RuleMatch> {
    let incoming_perfect = matches!(
        payload.and_then(|p| p.get("perfect")),
        Some(Value::Bool(true))
    );
    if !incoming_perfect {
        return None;
    }
    let perfect = activity
        .recent(config.perfect_window)
        .iter()
        .filter(|record| record.flag("perfect"))
        .count();
    if perfect >= config.perfect_threshold {
        return Some(RuleMatch {
            rule_id: "B4",
            reason: "implausible perfect streak",
            confidence: 0.85,
        });
    }
    None
}

fn machine_timing(activity: &UserActivity, config: &DetectionConfig) -> Option<RuleMatch> {
    let intervals = activity.intervals_of_last(config.timing_window);
    if intervals.is_empty() {
        return None;
    }
    let min = *intervals.iter().min()?;
    let max = *intervals.iter().max()?;
    if max - min < config.timing_spread_ms && min < config.timing_min_interval_ms {
        return Some(RuleMatch {
            rule_id: "B5",
            reason: "machine-like action timing",
            confidence: 0.9,
        });
    }
    None
}

fn rapid_state_changes(activity: &UserActivity, config: &DetectionConfig) -> Option<RuleMatch> {
    let span = activity.span_of_last(config.rapid_window)?;
    if span < config.rapid_span_ms {
        return Some(RuleMatch {
            rule_id: "B6",
            reason: "rapid state changes",
            confidence: 0.85,
        });
    }
    None
}

fn variance(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    samples
        .iter()
        .map(|sample| (sample - mean).powi(2))
        .sum::<f64>()
        / samples.len() as f64
}
