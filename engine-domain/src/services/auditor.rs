// Score auditor
// Stateless numeric-consistency checks run once per completed session.
// Ordered decision list; every match blocks the payout.

use crate::entities::{Decision, DetectionConfig, RuleMatch, UserActivity};
use crate::services::detector::CheckOutcome;

/// A submitted end-of-session result.
#[derive(Debug, Clone, Copy)]
pub struct ScoreSubmission {
    pub score: f64,
    pub duration_secs: f64,
    pub actions_count: u64,
}

pub fn validate_score(
    submission: &ScoreSubmission,
    activity: Option<&UserActivity>,
    config: &DetectionConfig,
) -> CheckOutcome {
    match score_match(submission, activity, config) {
        Some(rule) => {
            let decision = rule.decision(true);
            CheckOutcome {
                decision,
                fired: Some(rule),
            }
        }
        None => CheckOutcome::decided(Decision::pass()),
    }
}

fn score_match(
    submission: &ScoreSubmission,
    activity: Option<&UserActivity>,
    config: &DetectionConfig,
) -> Option<RuleMatch> {
    let ScoreSubmission {
        score,
        duration_secs,
        actions_count,
    } = *submission;

    if score / duration_secs.max(1.0) > config.max_score_per_second {
        return Some(RuleMatch {
            rule_id: "S1",
            reason: "score rate exceeds plausible play",
            confidence: 0.95,
        });
    }

    if actions_count > 0 && score / actions_count as f64 > config.max_score_per_action {
        return Some(RuleMatch {
            rule_id: "S2",
            reason: "score per action exceeds plausible play",
            confidence: 0.9,
        });
    }

    if score > config.instant_score && duration_secs < config.instant_duration_secs {
        return Some(RuleMatch {
            rule_id: "S3",
            reason: "high score in short session",
            confidence: 0.9,
        });
    }

    if let Some(activity) = activity {
        if let Some(accuracy) = session_accuracy(activity, config) {
            if accuracy >= 1.0 && score > config.perfect_accuracy_score {
                return Some(RuleMatch {
                    rule_id: "S4",
                    reason: "perfect accuracy over a long run",
                    confidence: 0.85,
                });
            }
        }
    }

    if duration_secs <= 0.0 {
        return Some(RuleMatch {
            rule_id: "S5",
            reason: "non-positive session duration",
            confidence: 1.0,
        });
    }

    if actions_count as f64 / duration_secs > config.max_actions_per_second {
        return Some(RuleMatch {
            rule_id: "S6",
            reason: "action rate exceeds plausible play",
            confidence: 0.9,
        });
    }

    if score < 0.0 || score > config.max_score || !score.is_finite() {
        return Some(RuleMatch {
            rule_id: "S7",
            reason: "score outside valid range",
            confidence: 1.0,
        });
    }

    None
}

/// Fraction of the last `accuracy_window` ledger actions not explicitly
/// marked incorrect. None below the sample floor.
fn session_accuracy(activity: &UserActivity, config: &DetectionConfig) -> Option<f64> {
    let samples = activity.recent(config.accuracy_window);
    if samples.len() <= config.accuracy_min_samples {
        return None;
    }
    let accurate = samples
        .iter()
        .filter(|record| !record.flag_is_false("correct"))
        .count();
    Some(accurate as f64 / samples.len() as f64)
}
