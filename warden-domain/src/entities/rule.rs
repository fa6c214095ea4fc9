// Detection rule entity
// Parameters are a tagged variant per rule type so malformed rules
// fail at registration, not at evaluation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRule {
    pub rule_id: String,
    pub name: String,
    /// Action types this rule applies to.
    pub action_types: Vec<String>,
    #[serde(flatten)]
    pub params: RuleParams,
    /// 0.0..=5.0, base severity before evaluator scaling.
    pub severity: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule_type", content = "parameters", rename_all = "snake_case")]
pub enum RuleParams {
    RateLimit {
        #[serde(default = "default_window_secs")]
        window_secs: f64,
        #[serde(default)]
        max_per_minute: Option<u32>,
        #[serde(default)]
        max_value_per_minute: Option<f64>,
    },
    Threshold {
        #[serde(default)]
        max_value: Option<f64>,
        #[serde(default)]
        min_value: Option<f64>,
    },
    Pattern {
        #[serde(default = "default_pattern_length")]
        pattern_length: usize,
        #[serde(default)]
        repetition_threshold: Option<u32>,
        #[serde(default)]
        perfect_timing_threshold: Option<f64>,
    },
    Statistical {
        z_threshold: f64,
        #[serde(default = "default_min_samples")]
        min_samples: usize,
    },
    Custom {
        /// Key into the custom-rule registry.
        hook: String,
    },
}

fn default_window_secs() -> f64 {
    60.0
}

fn default_pattern_length() -> usize {
    3
}

fn default_min_samples() -> usize {
    10
}

impl RuleParams {
    pub fn rule_type(&self) -> &'static str {
        match self {
            RuleParams::RateLimit { .. } => "rate_limit",
            RuleParams::Threshold { .. } => "threshold",
            RuleParams::Pattern { .. } => "pattern",
            RuleParams::Statistical { .. } => "statistical",
            RuleParams::Custom { .. } => "custom",
        }
    }
}

impl DetectionRule {
    pub fn applies_to(&self, action_type: &str) -> bool {
        self.action_types.iter().any(|name| name == action_type)
    }

    /// Registration-time validation. Returns a human-readable reason
    /// when the rule can never produce a meaningful evaluation.
    pub fn validate(&self) -> Result<(), String> {
        if self.rule_id.trim().is_empty() {
            return Err("rule_id must not be empty".to_string());
        }
        if self.action_types.is_empty() {
            return Err(format!("rule {} has no action_types", self.rule_id));
        }
        if !(0.0..=5.0).contains(&self.severity) {
            return Err(format!(
                "rule {} severity {} outside 0.0..=5.0",
                self.rule_id, self.severity
            ));
        }
        match &self.params {
            RuleParams::RateLimit {
                window_secs,
                max_per_minute,
                max_value_per_minute,
            } => {
                if *window_secs <= 0.0 {
                    return Err(format!("rule {} window_secs must be positive", self.rule_id));
                }
                if max_per_minute.is_none() && max_value_per_minute.is_none() {
                    return Err(format!(
                        "rule {} needs max_per_minute or max_value_per_minute",
                        self.rule_id
                    ));
                }
            }
            RuleParams::Threshold {
                max_value,
                min_value,
            } => {
                if max_value.is_none() && min_value.is_none() {
                    return Err(format!(
                        "rule {} needs max_value or min_value",
                        self.rule_id
                    ));
                }
            }
            RuleParams::Pattern {
                pattern_length,
                repetition_threshold,
                perfect_timing_threshold,
            } => {
                if *pattern_length == 0 {
                    return Err(format!("rule {} pattern_length must be positive", self.rule_id));
                }
                if repetition_threshold.is_none() && perfect_timing_threshold.is_none() {
                    return Err(format!(
                        "rule {} needs repetition_threshold or perfect_timing_threshold",
                        self.rule_id
                    ));
                }
            }
            RuleParams::Statistical {
                z_threshold,
                min_samples,
            } => {
                if *z_threshold <= 0.0 {
                    return Err(format!("rule {} z_threshold must be positive", self.rule_id));
                }
                if *min_samples < 3 {
                    return Err(format!(
                        "rule {} min_samples must be at least 3",
                        self.rule_id
                    ));
                }
            }
            RuleParams::Custom { hook } => {
                if hook.trim().is_empty() {
                    return Err(format!("rule {} custom hook must not be empty", self.rule_id));
                }
            }
        }
        Ok(())
    }
}
