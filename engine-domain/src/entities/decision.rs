// Decision entity
// The outcome returned to the reward layer for a checked action or score

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub suspicious: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub confidence: f64,
    pub blocked: bool,
}

impl Decision {
    pub fn pass() -> Self {
        Self {
            suspicious: false,
            reason: None,
            confidence: 0.0,
            blocked: false,
        }
    }

    /// Suspicious but still allowed through.
    pub fn flag(reason: &str, confidence: f64) -> Self {
        Self {
            suspicious: true,
            reason: Some(reason.to_string()),
            confidence,
            blocked: false,
        }
    }

    pub fn deny(reason: &str, confidence: f64) -> Self {
        Self {
            suspicious: true,
            reason: Some(reason.to_string()),
            confidence,
            blocked: true,
        }
    }
}
