// Rule evaluation
// Stateless evaluators over a player's action window. Every enabled,
// applicable rule runs on every action; rules contribute violations
// independently and never short-circuit each other.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::entities::action::Action;
use crate::entities::profile::GameProfile;
use crate::entities::rule::{DetectionRule, RuleParams};
use crate::entities::violation::{Violation, ViolationType};

pub type CustomRuleFn = Arc<
    dyn Fn(&DetectionRule, &[Action], &GameProfile) -> anyhow::Result<Option<Violation>>
        + Send
        + Sync,
>;

const SEVERITY_CAP: f64 = 5.0;
const PATTERN_SCAN_LIMIT: usize = 20;
const TIMING_MIN_SAMPLES: usize = 5;

#[derive(Default)]
pub struct RuleEngine {
    custom_rules: HashMap<String, CustomRuleFn>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_custom(&mut self, hook: impl Into<String>, rule_fn: CustomRuleFn) {
        self.custom_rules.insert(hook.into(), rule_fn);
    }

    /// Evaluates one rule against the window. `now` is the event time
    /// of the action under analysis so trailing windows are measured
    /// in event time, not wall-clock time.
    pub fn evaluate(
        &self,
        rule: &DetectionRule,
        window: &[Action],
        profile: &GameProfile,
        now: f64,
    ) -> Option<Violation> {
        if window.is_empty() {
            return None;
        }
        match &rule.params {
            RuleParams::RateLimit {
                window_secs,
                max_per_minute,
                max_value_per_minute,
            } => evaluate_rate_limit(
                rule,
                window,
                now,
                *window_secs,
                *max_per_minute,
                *max_value_per_minute,
            ),
            RuleParams::Threshold {
                max_value,
                min_value,
            } => evaluate_threshold(rule, window, now, *max_value, *min_value),
            RuleParams::Pattern {
                pattern_length,
                repetition_threshold,
                perfect_timing_threshold,
            } => evaluate_pattern(
                rule,
                window,
                now,
                *pattern_length,
                *repetition_threshold,
                *perfect_timing_threshold,
            ),
            RuleParams::Statistical {
                z_threshold,
                min_samples,
            } => evaluate_statistical(rule, window, now, *z_threshold, *min_samples),
            RuleParams::Custom { hook } => self.evaluate_custom(hook, rule, window, profile),
        }
    }

    fn evaluate_custom(
        &self,
        hook: &str,
        rule: &DetectionRule,
        window: &[Action],
        profile: &GameProfile,
    ) -> Option<Violation> {
        let Some(rule_fn) = self.custom_rules.get(hook) else {
            warn!("custom rule hook '{}' not registered (rule {})", hook, rule.rule_id);
            return None;
        };
        match rule_fn(rule, window, profile) {
            Ok(result) => result,
            Err(err) => {
                warn!("custom rule {} failed: {}", rule.rule_id, err);
                None
            }
        }
    }
}

fn scaled_severity(base: f64, ratio: f64) -> f64 {
    (base * ratio).clamp(0.0, SEVERITY_CAP)
}

fn relevant<'a>(rule: &'a DetectionRule, window: &'a [Action]) -> impl Iterator<Item = &'a Action> {
    window.iter().filter(|a| rule.applies_to(&a.action_type))
}

fn base_violation(
    rule: &DetectionRule,
    violation_type: ViolationType,
    sample: &Action,
    severity: f64,
    now: f64,
) -> Violation {
    Violation::new(
        sample.player_id.clone(),
        sample.game_id.clone(),
        violation_type,
        rule.rule_id.clone(),
        severity,
        now,
    )
}

fn evaluate_rate_limit(
    rule: &DetectionRule,
    window: &[Action],
    now: f64,
    window_secs: f64,
    max_per_minute: Option<u32>,
    max_value_per_minute: Option<f64>,
) -> Option<Violation> {
    let cutoff = now - window_secs;
    let matching: Vec<&Action> = relevant(rule, window)
        .filter(|a| a.timestamp >= cutoff)
        .collect();
    let sample = *matching.last()?;

    if let Some(max_count) = max_per_minute {
        // Exactly max_count actions is legal; the violation requires
        // strictly more.
        if matching.len() > max_count as usize {
            let ratio = matching.len() as f64 / max_count.max(1) as f64;
            let context: Vec<Action> = matching.iter().rev().take(5).rev().cloned().cloned().collect();
            return Some(
                base_violation(
                    rule,
                    ViolationType::RateLimitExceeded,
                    sample,
                    scaled_severity(rule.severity, ratio),
                    now,
                )
                .with_detail("actual_count", json!(matching.len()))
                .with_detail("max_allowed", json!(max_count))
                .with_detail("window_secs", json!(window_secs))
                .with_context(&context),
            );
        }
    }

    if let Some(max_value) = max_value_per_minute {
        let total: f64 = matching.iter().filter_map(|a| a.value.numeric()).sum();
        if total > max_value {
            let ratio = total / max_value.max(f64::EPSILON);
            let context: Vec<Action> = matching.iter().rev().take(5).rev().cloned().cloned().collect();
            return Some(
                base_violation(
                    rule,
                    ViolationType::RateLimitExceeded,
                    sample,
                    scaled_severity(rule.severity, ratio),
                    now,
                )
                .with_detail("actual_value", json!(total))
                .with_detail("max_allowed", json!(max_value))
                .with_detail("window_secs", json!(window_secs))
                .with_detail("value_kind", json!("cumulative"))
                .with_context(&context),
            );
        }
    }

    None
}

fn evaluate_threshold(
    rule: &DetectionRule,
    window: &[Action],
    now: f64,
    max_value: Option<f64>,
    min_value: Option<f64>,
) -> Option<Violation> {
    let latest = relevant(rule, window).last()?;
    let value = latest.value.numeric()?;

    if let Some(max) = max_value {
        if value > max {
            return Some(
                base_violation(rule, ViolationType::ThresholdExceeded, latest, rule.severity, now)
                    .with_detail("actual_value", json!(value))
                    .with_detail("max_allowed", json!(max))
                    .with_detail("threshold_kind", json!("maximum"))
                    .with_context(std::slice::from_ref(latest)),
            );
        }
    }
    if let Some(min) = min_value {
        if value < min {
            return Some(
                base_violation(rule, ViolationType::ThresholdExceeded, latest, rule.severity, now)
                    .with_detail("actual_value", json!(value))
                    .with_detail("min_allowed", json!(min))
                    .with_detail("threshold_kind", json!("minimum"))
                    .with_context(std::slice::from_ref(latest)),
            );
        }
    }
    None
}

fn evaluate_pattern(
    rule: &DetectionRule,
    window: &[Action],
    now: f64,
    pattern_length: usize,
    repetition_threshold: Option<u32>,
    perfect_timing_threshold: Option<f64>,
) -> Option<Violation> {
    let matching: Vec<&Action> = relevant(rule, window).collect();

    if let Some(threshold) = repetition_threshold {
        if matching.len() >= pattern_length * 2 {
            let start = matching.len().saturating_sub(PATTERN_SCAN_LIMIT);
            let recent = &matching[start..];
            let mut counts: HashMap<Vec<&str>, u32> = HashMap::new();
            for slice in recent.windows(pattern_length) {
                let sequence: Vec<&str> = slice.iter().map(|a| a.action_type.as_str()).collect();
                *counts.entry(sequence).or_insert(0) += 1;
            }
            if let Some((sequence, repetitions)) = counts.into_iter().max_by_key(|(_, n)| *n) {
                if repetitions >= threshold {
                    let context: Vec<Action> =
                        recent.iter().rev().take(10).rev().cloned().cloned().collect();
                    let sample = *matching.last()?;
                    return Some(
                        base_violation(
                            rule,
                            ViolationType::SuspiciousPattern,
                            sample,
                            rule.severity,
                            now,
                        )
                        .with_detail("pattern", json!(sequence.join("->")))
                        .with_detail("repetitions", json!(repetitions))
                        .with_detail("threshold", json!(threshold))
                        .with_detail("pattern_kind", json!("sequence_repetition"))
                        .with_context(&context),
                    );
                }
            }
        }
    }

    if let Some(threshold) = perfect_timing_threshold {
        if matching.len() >= TIMING_MIN_SAMPLES {
            let intervals: Vec<f64> = matching
                .windows(2)
                .map(|pair| pair[1].timestamp - pair[0].timestamp)
                .collect();
            let timing_variance = variance(&intervals);
            // Near-zero variance means scripted timing, not human jitter.
            if timing_variance < threshold {
                let context: Vec<Action> =
                    matching.iter().rev().take(5).rev().cloned().cloned().collect();
                let sample = *matching.last()?;
                return Some(
                    base_violation(
                        rule,
                        ViolationType::SuspiciousPattern,
                        sample,
                        rule.severity,
                        now,
                    )
                    .with_detail("timing_variance", json!(timing_variance))
                    .with_detail("threshold", json!(threshold))
                    .with_detail("interval_count", json!(intervals.len()))
                    .with_detail("pattern_kind", json!("perfect_timing"))
                    .with_context(&context),
                );
            }
        }
    }

    None
}

fn evaluate_statistical(
    rule: &DetectionRule,
    window: &[Action],
    now: f64,
    z_threshold: f64,
    min_samples: usize,
) -> Option<Violation> {
    let values: Vec<(f64, &Action)> = relevant(rule, window)
        .filter_map(|a| a.value.numeric().map(|v| (v, a)))
        .collect();
    if values.len() < min_samples {
        return None;
    }

    let (latest_value, latest_action) = *values.last()?;
    let baseline: Vec<f64> = values[..values.len() - 1].iter().map(|(v, _)| *v).collect();
    let baseline_mean = mean(&baseline);
    let baseline_std = variance(&baseline).sqrt();
    if baseline_std <= 0.0 {
        return None;
    }

    let z_score = ((latest_value - baseline_mean) / baseline_std).abs();
    if z_score <= z_threshold {
        return None;
    }

    Some(
        base_violation(
            rule,
            ViolationType::StatisticalAnomaly,
            latest_action,
            scaled_severity(rule.severity, z_score / z_threshold),
            now,
        )
        .with_detail("z_score", json!(z_score))
        .with_detail("threshold", json!(z_threshold))
        .with_detail("baseline_mean", json!(baseline_mean))
        .with_detail("baseline_std", json!(baseline_std))
        .with_detail("anomaly_value", json!(latest_value))
        .with_context(std::slice::from_ref(latest_action)),
    )
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64
}
