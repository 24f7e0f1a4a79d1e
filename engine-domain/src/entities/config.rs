// Runtime tuning for the detection services
// Defaults carry the production thresholds

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Rolling ledger capacity per user.
    pub max_tracked_actions: usize,
    /// Two actions closer than this are faster than a human can act.
    pub min_action_interval_ms: i64,
    pub burst_window_ms: i64,
    pub burst_threshold: usize,
    /// Window of trailing same-type actions examined for scripted cadence.
    pub pattern_window: usize,
    pub pattern_variance_ms2: f64,
    pub perfect_window: usize,
    pub perfect_threshold: usize,
    pub timing_window: usize,
    pub timing_spread_ms: i64,
    pub timing_min_interval_ms: i64,
    pub rapid_window: usize,
    pub rapid_span_ms: i64,
    /// Auto-block window after a suspicious event.
    pub cooldown_ms: i64,
    /// Strikes before a user is blocked until operator review.
    pub max_suspicious_events: u32,
    /// Distinct accounts a device or address may share before it is flagged.
    pub shared_user_limit: usize,
    pub ip_block_hours: i64,
    pub stats_window_ms: i64,
    pub retention_days: i64,
    // Score auditing
    pub max_score_per_second: f64,
    pub max_score_per_action: f64,
    pub instant_score: f64,
    pub instant_duration_secs: f64,
    pub perfect_accuracy_score: f64,
    pub accuracy_window: usize,
    pub accuracy_min_samples: usize,
    pub max_actions_per_second: f64,
    pub max_score: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_tracked_actions: 200,
            min_action_interval_ms: 50,
            burst_window_ms: 1_000,
            burst_threshold: 15,
            pattern_window: 5,
            pattern_variance_ms2: 100.0,
            perfect_window: 20,
            perfect_threshold: 15,
            timing_window: 10,
            timing_spread_ms: 10,
            timing_min_interval_ms: 100,
            rapid_window: 5,
            rapid_span_ms: 200,
            cooldown_ms: 60_000,
            max_suspicious_events: 3,
            shared_user_limit: 3,
            ip_block_hours: 24,
            stats_window_ms: 60_000,
            retention_days: 30,
            max_score_per_second: 5_000.0,
            max_score_per_action: 10_000.0,
            instant_score: 50_000.0,
            instant_duration_secs: 10.0,
            perfect_accuracy_score: 30_000.0,
            accuracy_window: 100,
            accuracy_min_samples: 20,
            max_actions_per_second: 20.0,
            max_score: 1_000_000.0,
        }
    }
}

impl DetectionConfig {
    pub fn ip_block_ms(&self) -> i64 {
        self.ip_block_hours * 3_600_000
    }

    pub fn retention_ms(&self) -> i64 {
        self.retention_days * 86_400_000
    }
}
