// Violation entity
// A detected anomaly tied to a rule and the actions that triggered it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::action::Action;
use crate::value_objects::RiskLevel;

/// Violations keep at most this many triggering actions as context.
pub const ACTION_CONTEXT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    RateLimitExceeded,
    ThresholdExceeded,
    SuspiciousPattern,
    StatisticalAnomaly,
    MlDetection,
    CustomRule,
    InvalidAction,
}

impl ViolationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationType::RateLimitExceeded => "rate_limit_exceeded",
            ViolationType::ThresholdExceeded => "threshold_exceeded",
            ViolationType::SuspiciousPattern => "suspicious_pattern",
            ViolationType::StatisticalAnomaly => "statistical_anomaly",
            ViolationType::MlDetection => "ml_detection",
            ViolationType::CustomRule => "custom_rule",
            ViolationType::InvalidAction => "invalid_action",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub player_id: String,
    pub game_id: String,
    pub violation_type: ViolationType,
    pub rule_id: String,
    pub severity: f64,
    pub timestamp: f64,
    #[serde(default)]
    pub details: serde_json::Map<String, Value>,
    #[serde(default)]
    pub action_context: Vec<Action>,
}

impl Violation {
    pub fn new(
        player_id: impl Into<String>,
        game_id: impl Into<String>,
        violation_type: ViolationType,
        rule_id: impl Into<String>,
        severity: f64,
        timestamp: f64,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            game_id: game_id.into(),
            violation_type,
            rule_id: rule_id.into(),
            severity,
            timestamp,
            details: serde_json::Map::new(),
            action_context: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }

    pub fn with_context(mut self, actions: &[Action]) -> Self {
        let start = actions.len().saturating_sub(ACTION_CONTEXT_LIMIT);
        self.action_context = actions[start..].to_vec();
        self
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_severity(self.severity)
    }
}
