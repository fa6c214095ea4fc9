// Game profile entity
// Data-driven per-game configuration: valid actions and detection rules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::action::ActionValue;
use crate::entities::rule::DetectionRule;
use crate::value_objects::{ActionCategory, Genre};

/// Actions carrying more metadata entries than this are rejected at
/// validation so one client cannot inflate the hot window.
pub const METADATA_MAX_ENTRIES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Number,
    Integer,
    Flag,
    Text,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    pub category: ActionCategory,
    pub value_type: ValueType,
    #[serde(default)]
    pub value_range: Option<ValueRange>,
    #[serde(default)]
    pub required_metadata: Vec<String>,
    #[serde(default)]
    pub optional_metadata: Vec<String>,
}

impl ActionDefinition {
    pub fn new(name: &str, category: ActionCategory, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            category,
            value_type,
            value_range: None,
            required_metadata: Vec::new(),
            optional_metadata: Vec::new(),
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.value_range = Some(ValueRange { min, max });
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("action name must not be empty".to_string());
        }
        if let Some(range) = &self.value_range {
            if range.min > range.max {
                return Err(format!(
                    "action {} has inverted value_range [{}, {}]",
                    self.name, range.min, range.max
                ));
            }
        }
        if self.required_metadata.iter().any(|f| f.trim().is_empty()) {
            return Err(format!("action {} has an empty required metadata name", self.name));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameProfile {
    pub game_id: String,
    pub name: String,
    pub genre: Genre,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actions: HashMap<String, ActionDefinition>,
    #[serde(default)]
    pub detection_rules: Vec<DetectionRule>,
    pub auto_ban_threshold: f64,
    pub warning_threshold: f64,
}

impl GameProfile {
    pub fn new(game_id: &str, name: &str, genre: Genre, description: &str) -> Self {
        Self {
            game_id: game_id.to_string(),
            name: name.to_string(),
            genre,
            description: description.to_string(),
            actions: HashMap::new(),
            detection_rules: Vec::new(),
            auto_ban_threshold: 8.0,
            warning_threshold: 5.0,
        }
    }

    pub fn add_action(&mut self, definition: ActionDefinition) {
        self.actions.insert(definition.name.clone(), definition);
    }

    pub fn add_rule(&mut self, rule: DetectionRule) {
        self.detection_rules.push(rule);
    }

    pub fn has_rule(&self, rule_id: &str) -> bool {
        self.detection_rules.iter().any(|r| r.rule_id == rule_id)
    }

    /// Enabled rules applicable to one action type, in definition order.
    pub fn rules_for<'a>(
        &'a self,
        action_type: &'a str,
    ) -> impl Iterator<Item = &'a DetectionRule> + 'a {
        self.detection_rules
            .iter()
            .filter(move |rule| rule.enabled && rule.applies_to(action_type))
    }

    /// Input validation before any rule sees the action.
    pub fn validate_action(
        &self,
        action_type: &str,
        value: &ActionValue,
        metadata: &HashMap<String, String>,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let Some(definition) = self.actions.get(action_type) else {
            errors.push(ValidationError::new(
                "action_type",
                format!("unknown action type: {action_type}"),
            ));
            return errors;
        };

        match (definition.value_type, value) {
            (ValueType::Number, ActionValue::Number(_)) => {}
            (ValueType::Integer, ActionValue::Number(n)) => {
                if n.fract() != 0.0 {
                    errors.push(ValidationError::new(
                        "value",
                        format!("value {n} must be an integer for {action_type}"),
                    ));
                }
            }
            (ValueType::Flag, ActionValue::Flag(_)) => {}
            (ValueType::Text, ActionValue::Text(_)) => {}
            (expected, _) => {
                errors.push(ValidationError::new(
                    "value",
                    format!("value has wrong type for {action_type}, expected {expected:?}"),
                ));
            }
        }

        if let (Some(range), Some(number)) = (&definition.value_range, value.numeric()) {
            if number < range.min || number > range.max {
                errors.push(ValidationError::new(
                    "value",
                    format!(
                        "value {number} out of range [{}, {}] for {action_type}",
                        range.min, range.max
                    ),
                ));
            }
        }

        if metadata.len() > METADATA_MAX_ENTRIES {
            errors.push(ValidationError::new(
                "metadata",
                format!(
                    "metadata has {} entries, limit is {METADATA_MAX_ENTRIES}",
                    metadata.len()
                ),
            ));
        }
        for required in &definition.required_metadata {
            if !metadata.contains_key(required) {
                errors.push(ValidationError::new(
                    "metadata",
                    format!("required metadata field '{required}' missing for {action_type}"),
                ));
            }
        }

        errors
    }
}
