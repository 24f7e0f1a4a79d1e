use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    actions_recorded: AtomicU64,
    checks_performed: AtomicU64,
    scores_validated: AtomicU64,
    suspicious_events: AtomicU64,
    blocked_decisions: AtomicU64,
}

impl Metrics {
    pub fn record_action(&self) {
        self.actions_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_check(&self) {
        self.checks_performed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_score(&self) {
        self.scores_validated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suspicious(&self) {
        self.suspicious_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block(&self) {
        self.blocked_decisions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let actions = self.actions_recorded.load(Ordering::Relaxed);
        let checks = self.checks_performed.load(Ordering::Relaxed);
        let scores = self.scores_validated.load(Ordering::Relaxed);
        let suspicious = self.suspicious_events.load(Ordering::Relaxed);
        let blocked = self.blocked_decisions.load(Ordering::Relaxed);

        format!(
            "# TYPE warden_actions_recorded_total counter\n\
warden_actions_recorded_total {}\n\
# TYPE warden_checks_performed_total counter\n\
warden_checks_performed_total {}\n\
# TYPE warden_scores_validated_total counter\n\
warden_scores_validated_total {}\n\
# TYPE warden_suspicious_events_total counter\n\
warden_suspicious_events_total {}\n\
# TYPE warden_blocked_decisions_total counter\n\
warden_blocked_decisions_total {}\n",
            actions, checks, scores, suspicious, blocked
        )
    }
}
