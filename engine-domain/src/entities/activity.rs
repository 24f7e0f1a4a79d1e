// Per-user activity ledger entry
// Bounded FIFO of recent actions plus the escalation counters

use std::collections::VecDeque;

use serde::Serialize;

use super::action::ActionRecord;

#[derive(Debug, Clone)]
pub struct UserActivity {
    actions: VecDeque<ActionRecord>,
    capacity: usize,
    pub suspicious_count: u32,
    /// 0 means no suspicious event has been seen yet.
    pub last_suspicious_ms: i64,
    pub first_action_ms: i64,
    pub last_action_ms: i64,
}

impl UserActivity {
    pub fn new(now_ms: i64, capacity: usize) -> Self {
        Self {
            actions: VecDeque::new(),
            capacity: capacity.max(1),
            suspicious_count: 0,
            last_suspicious_ms: 0,
            first_action_ms: now_ms,
            last_action_ms: now_ms,
        }
    }

    pub fn push_action(&mut self, record: ActionRecord) {
        self.last_action_ms = record.time_ms;
        if self.actions.len() == self.capacity {
            self.actions.pop_front();
        }
        self.actions.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn last(&self) -> Option<&ActionRecord> {
        self.actions.back()
    }

    /// Last `n` actions in chronological order (fewer if the ledger is short).
    pub fn recent(&self, n: usize) -> Vec<&ActionRecord> {
        let skip = self.actions.len().saturating_sub(n);
        self.actions.iter().skip(skip).collect()
    }

    pub fn count_since(&self, cutoff_ms: i64) -> usize {
        self.actions
            .iter()
            .rev()
            .take_while(|record| record.time_ms > cutoff_ms)
            .count()
    }

    /// Inter-arrival intervals of the last `n` actions, oldest first.
    /// Empty when fewer than `n` actions are recorded.
    pub fn intervals_of_last(&self, n: usize) -> Vec<i64> {
        if self.actions.len() < n || n < 2 {
            return Vec::new();
        }
        self.recent(n)
            .windows(2)
            .map(|pair| pair[1].time_ms - pair[0].time_ms)
            .collect()
    }

    /// Wall-clock span covered by the last `n` actions.
    pub fn span_of_last(&self, n: usize) -> Option<i64> {
        if self.actions.len() < n || n < 2 {
            return None;
        }
        let recent = self.recent(n);
        Some(recent[recent.len() - 1].time_ms - recent[0].time_ms)
    }

    pub fn stats(&self, window_ms: i64, now_ms: i64) -> ActivityStats {
        let cutoff = now_ms - window_ms;
        let recent: Vec<&ActionRecord> = self
            .actions
            .iter()
            .filter(|record| record.time_ms > cutoff)
            .collect();
        let avg_interval_ms = if recent.len() >= 2 {
            let span = recent[recent.len() - 1].time_ms - recent[0].time_ms;
            span as f64 / (recent.len() - 1) as f64
        } else {
            0.0
        };
        ActivityStats {
            total_actions: self.actions.len(),
            recent_actions: recent.len(),
            avg_interval_ms,
            actions_per_second: recent.len() as f64 / (window_ms as f64 / 1000.0),
            suspicious_count: self.suspicious_count,
            last_suspicious_ms: self.last_suspicious_ms,
            first_action_ms: self.first_action_ms,
            last_action_ms: self.last_action_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityStats {
    pub total_actions: usize,
    pub recent_actions: usize,
    pub avg_interval_ms: f64,
    pub actions_per_second: f64,
    pub suspicious_count: u32,
    pub last_suspicious_ms: i64,
    pub first_action_ms: i64,
    pub last_action_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(time_ms: i64) -> ActionRecord {
        ActionRecord {
            time_ms,
            action_type: "tap".to_string(),
            payload: None,
        }
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut activity = UserActivity::new(0, 3);
        for t in 0..5 {
            activity.push_action(action(t));
        }
        assert_eq!(activity.len(), 3);
        assert_eq!(activity.recent(3)[0].time_ms, 2);
        assert_eq!(activity.last().expect("last").time_ms, 4);
    }

    #[test]
    fn counts_actions_inside_window() {
        let mut activity = UserActivity::new(0, 10);
        for t in [0, 500, 900, 1000, 1100] {
            activity.push_action(action(t));
        }
        assert_eq!(activity.count_since(100), 4);
        assert_eq!(activity.count_since(1100), 0);
    }

    #[test]
    fn intervals_and_span() {
        let mut activity = UserActivity::new(0, 10);
        for t in [0, 100, 250, 300] {
            activity.push_action(action(t));
        }
        assert_eq!(activity.intervals_of_last(3), vec![150, 50]);
        assert_eq!(activity.span_of_last(4), Some(300));
        assert!(activity.intervals_of_last(5).is_empty());
        assert_eq!(activity.span_of_last(5), None);
    }

    #[test]
    fn stats_over_trailing_window() {
        let mut activity = UserActivity::new(0, 10);
        for t in [1_000, 30_000, 45_000, 60_000] {
            activity.push_action(action(t));
        }
        let stats = activity.stats(60_000, 61_000);
        assert_eq!(stats.total_actions, 4);
        assert_eq!(stats.recent_actions, 3);
        assert!((stats.avg_interval_ms - 15_000.0).abs() < f64::EPSILON);
        assert!((stats.actions_per_second - 0.05).abs() < 1e-9);
    }
}
