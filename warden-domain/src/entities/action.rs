// Action entity
// One timestamped, typed event submitted by/about a player.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::violation::Violation;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub player_id: String,
    pub game_id: String,
    pub action_type: String,
    /// Event time, seconds since epoch.
    pub timestamp: f64,
    #[serde(default)]
    pub value: ActionValue,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionValue {
    Number(f64),
    Text(String),
    Flag(bool),
    #[default]
    None,
}

impl ActionValue {
    pub fn numeric(&self) -> Option<f64> {
        match self {
            ActionValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// Outcome of analyzing a single action. Ban decisions are advisory;
/// mutating account state is the caller's business.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub violations: Vec<Violation>,
    pub risk_score: f64,
    pub should_ban: bool,
    pub ban_reason: Option<String>,
}
