use engine_domain::services::auditor::{self, ScoreSubmission};
use engine_domain::{current_millis, normalize_user_id, Decision};
use serde::Deserialize;
use tracing::warn;

use crate::EngineState;

/// Optional caller context for a session-end score validation.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ScoreInput {
    pub game_id: Option<String>,
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
}

/// Audits a submitted session result before payout is authorized. Reads
/// the ledger only for accuracy statistics; never touches the strike
/// counter.
pub async fn validate_score(
    state: &EngineState,
    user_id: &str,
    score: f64,
    duration_secs: f64,
    actions_count: u64,
    input: ScoreInput,
) -> Decision {
    let now = current_millis();
    state.metrics.record_score();

    let user_key = normalize_user_id(user_id);
    let submission = ScoreSubmission {
        score,
        duration_secs,
        actions_count,
    };

    let outcome = match state.ledger_entry(&user_key).await {
        Some(entry) => {
            let activity = entry.lock().await;
            auditor::validate_score(&submission, Some(&activity), &state.config)
        }
        None => auditor::validate_score(&submission, None, &state.config),
    };

    if let Some(rule) = &outcome.fired {
        warn!("implausible score for {}: {}", user_key, rule.reason);
        state.metrics.record_suspicious();
        state.gateway.spawn_suspicious(rule.to_row(
            &user_key,
            input.game_id.as_deref(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::state_with_recorder;

    #[tokio::test]
    async fn plausible_score_passes() {
        let (state, recorder) = state_with_recorder();
        let decision = validate_score(&state, "0xabc", 100.0, 60.0, 10, ScoreInput::default()).await;
        assert!(!decision.suspicious);
        assert!(recorder.suspicious.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn implausible_rate_is_audited_with_game_id() {
        let (state, recorder) = state_with_recorder();
        let decision = validate_score(
            &state,
            "0xAbC",
            60_000.0,
            5.0,
            3,
            ScoreInput {
                game_id: Some("game-7".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(decision.blocked);
        assert_eq!(decision.confidence, 0.95);

        let rows = recorder.suspicious.lock().expect("lock");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "0xabc");
        assert_eq!(rows[0].game_id, "game-7");
        assert_eq!(rows[0].rule_id, "S1");
    }

    #[tokio::test]
    async fn out_of_range_scores_block_outright() {
        let (state, _recorder) = state_with_recorder();
        for score in [-1.0, 2_000_000.0, f64::NAN] {
            let decision =
                validate_score(&state, "0xabc", score, 600.0, 0, ScoreInput::default()).await;
            assert!(decision.suspicious);
            assert!(decision.blocked);
            assert_eq!(decision.confidence, 1.0);
        }
    }
}
