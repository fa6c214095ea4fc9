// Analysis pipeline
// One pass per submitted action: validate against the game profile,
// fold into the player's window, run rules, the ML signal and
// detection plugins, then score and commit under the per-player lock.

use std::time::Duration;

use serde_json::json;
use tokio::time::timeout;
use tracing::warn;
use warden_domain::services::risk;
use warden_domain::{
    now_secs, Action, AnalysisResult, GameProfile, PlayerKey, PlayerState, ValidationError,
    Violation, ViolationType,
};

use crate::{AppError, AppState};

const INVALID_ACTION_SEVERITY: f64 = 2.0;
/// ML scoring needs enough of a window to be meaningful.
const ML_MIN_WINDOW: usize = 10;

pub async fn analyze_action(
    state: &AppState,
    submitted: Action,
) -> Result<AnalysisResult, AppError> {
    let now = now_secs();
    state.metrics.record_action();

    let mut action = submitted;
    if action.player_id.trim().is_empty() || action.game_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "player_id and game_id must not be empty".to_string(),
        ));
    }
    if !action.timestamp.is_finite() || action.timestamp <= 0.0 {
        action.timestamp = now;
    }

    let profile = state
        .profiles
        .get(&action.game_id)
        .await
        .ok_or_else(|| AppError::ProfileNotFound(action.game_id.clone()))?;

    let key = PlayerKey::new(action.player_id.clone(), action.game_id.clone());
    let _guard = state.store.lock_key(&key).await;

    // Validation comes first: pre-processors only ever see well-formed
    // actions, and a dropping plugin cannot swallow the rejection.
    let errors = profile.validate_action(&action.action_type, &action.value, &action.metadata);
    if !errors.is_empty() {
        return reject_invalid(state, &key, &profile, action, errors, now).await;
    }

    let Some(action) = state.plugins.pre_process(action, &profile).await else {
        // A pre-processor dropped the action; report the current score
        // without recording anything.
        let player = state.store.get(&key, now).await?;
        let score =
            risk::decayed_score(player.cumulative_risk_score, player.last_action_secs, now);
        return Ok(AnalysisResult {
            violations: Vec::new(),
            risk_score: score,
            should_ban: false,
            ban_reason: None,
        });
    };

    let mut player = state.store.get(&key, now).await?;
    player.apply_action(action.clone());
    player.touch(now);

    let mut violations: Vec<Violation> = Vec::new();
    for rule in profile.rules_for(&action.action_type) {
        if let Some(violation) =
            state
                .rule_engine
                .evaluate(rule, &player.window, &profile, action.timestamp)
        {
            violations.push(violation);
        }
    }

    if let Some(violation) = ml_violation(state, &key, &player, &action).await {
        violations.push(violation);
    }

    violations.extend(state.plugins.detect(&action, &player, &profile).await);
    let violations = state.plugins.post_process(violations, &profile).await;

    player.record_violations(&violations, now);
    let assessment = risk::assess(&player, &profile, &state.ban_policy(), now);

    state.metrics.record_violations(violations.len());
    if assessment.should_ban {
        state.metrics.record_ban_recommendation();
    }

    let genre = profile.genre;
    state
        .store
        .commit(player, Some(action), violations.clone(), now)
        .await;

    let notable: Vec<Violation> = violations
        .iter()
        .filter(|v| v.severity >= state.config.notify_min_severity)
        .cloned()
        .collect();
    state.plugins.spawn_notifications(genre, notable);

    Ok(AnalysisResult {
        violations,
        risk_score: assessment.score,
        should_ban: assessment.should_ban,
        ban_reason: assessment.reason,
    })
}

/// Rejected input counts toward the score but never enters the window.
async fn reject_invalid(
    state: &AppState,
    key: &PlayerKey,
    profile: &GameProfile,
    action: Action,
    errors: Vec<ValidationError>,
    now: f64,
) -> Result<AnalysisResult, AppError> {
    state.metrics.record_invalid_action();

    let violation = Violation::new(
        action.player_id.clone(),
        action.game_id.clone(),
        ViolationType::InvalidAction,
        "input_validation",
        INVALID_ACTION_SEVERITY,
        now,
    )
    .with_detail("action_type", json!(action.action_type))
    .with_detail(
        "errors",
        serde_json::to_value(&errors).unwrap_or(serde_json::Value::Null),
    );

    let mut player = state.store.get(key, now).await?;
    let violations = vec![violation];
    player.record_violations(&violations, now);
    player.touch(now);
    let assessment = risk::assess(&player, profile, &state.ban_policy(), now);

    state.metrics.record_violations(violations.len());
    if assessment.should_ban {
        state.metrics.record_ban_recommendation();
    }

    let genre = profile.genre;
    state
        .store
        .commit(player, None, violations.clone(), now)
        .await;

    let notable: Vec<Violation> = violations
        .iter()
        .filter(|v| v.severity >= state.config.notify_min_severity)
        .cloned()
        .collect();
    state.plugins.spawn_notifications(genre, notable);

    Ok(AnalysisResult {
        violations,
        risk_score: assessment.score,
        should_ban: assessment.should_ban,
        ban_reason: assessment.reason,
    })
}

async fn ml_violation(
    state: &AppState,
    key: &PlayerKey,
    player: &PlayerState,
    action: &Action,
) -> Option<Violation> {
    let source = state.ml_signal.as_ref()?;
    if player.window.len() < ML_MIN_WINDOW {
        return None;
    }
    let deadline = Duration::from_millis(state.config.ml_timeout_ms);
    match timeout(deadline, source.score(key, &player.window)).await {
        Ok(Ok(Some(score))) => {
            state.metrics.record_ml_signal();
            if score.probability > state.config.ml_probability_threshold {
                Some(
                    Violation::new(
                        action.player_id.clone(),
                        action.game_id.clone(),
                        ViolationType::MlDetection,
                        "ml_signal",
                        (score.probability * 5.0).clamp(0.0, 5.0),
                        action.timestamp,
                    )
                    .with_detail("probability", json!(score.probability))
                    .with_detail("confidence", json!(score.confidence))
                    .with_detail("model", json!(score.model_name)),
                )
            } else {
                None
            }
        }
        Ok(Ok(None)) => None,
        Ok(Err(err)) => {
            warn!("ml signal failed for {}: {err}", key);
            None
        }
        Err(_) => {
            state.metrics.record_plugin_timeout();
            warn!("ml signal timed out for {}", key);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::test_support::{build_harness, test_config, FixedMlSignal};
    use warden_domain::services::genre_defaults::apply_genre_defaults;
    use warden_domain::{ActionValue, Genre};

    fn game(genre: Genre) -> GameProfile {
        let mut profile = GameProfile::new("g1", "Test", genre, "");
        apply_genre_defaults(&mut profile);
        profile
    }

    fn action(player: &str, action_type: &str, ts: f64, value: ActionValue) -> Action {
        Action {
            player_id: player.to_string(),
            game_id: "g1".to_string(),
            action_type: action_type.to_string(),
            timestamp: ts,
            value,
            metadata: Default::default(),
            session_id: None,
        }
    }

    #[tokio::test]
    async fn unknown_game_is_rejected() {
        let harness = build_harness(test_config(), Vec::new());
        let err = analyze_action(
            &harness.state,
            action("p1", "gain_exp", 0.0, ActionValue::Number(1.0)),
        )
        .await
        .expect_err("no profile");
        assert!(matches!(err, AppError::ProfileNotFound(_)));
    }

    #[tokio::test]
    async fn unknown_action_type_becomes_invalid_action_violation() {
        let harness = build_harness(test_config(), vec![game(Genre::Fps)]);
        let result = analyze_action(
            &harness.state,
            action("p1", "cast_spell", 0.0, ActionValue::Number(1.0)),
        )
        .await
        .expect("result");

        assert_eq!(result.violations.len(), 1);
        assert_eq!(
            result.violations[0].violation_type,
            ViolationType::InvalidAction
        );
        assert!(result.risk_score >= INVALID_ACTION_SEVERITY);

        // The rejected action never entered the window.
        let key = PlayerKey::new("p1", "g1");
        let player = harness.state.store.get(&key, now_secs()).await.expect("state");
        assert!(player.window.is_empty());
    }

    #[tokio::test]
    async fn invalid_action_is_rejected_before_pre_processing() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use async_trait::async_trait;
        use warden_domain::ports::{PluginMetadata, PreProcessingPlugin};
        use warden_domain::services::rule_engine::RuleEngine;

        use crate::plugins::PluginHost;
        use crate::test_support::{build_harness_with, PluginHostSetup};

        struct CountingDropper {
            seen: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl PreProcessingPlugin for CountingDropper {
            fn metadata(&self) -> PluginMetadata {
                PluginMetadata::new("counting_dropper", "1.0.0", "drops everything it sees")
            }

            async fn process(
                &self,
                _action: Action,
                _profile: &GameProfile,
            ) -> anyhow::Result<Option<Action>> {
                self.seen.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        }

        let seen = Arc::new(AtomicUsize::new(0));
        let plugin_seen = seen.clone();
        let setup = PluginHostSetup {
            configure: Some(Box::new(move |host: &mut PluginHost| {
                host.register_pre_processing(Arc::new(CountingDropper { seen: plugin_seen }));
            })),
        };
        let harness =
            build_harness_with(test_config(), vec![game(Genre::Fps)], RuleEngine::new(), setup);

        let result = analyze_action(
            &harness.state,
            action("p1", "cast_spell", now_secs(), ActionValue::Number(1.0)),
        )
        .await
        .expect("result");

        // Rejection happens before the plugin chain ever sees the action.
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(
            result.violations[0].violation_type,
            ViolationType::InvalidAction
        );
    }

    #[tokio::test]
    async fn reward_burst_triggers_rate_limit() {
        let harness = build_harness(test_config(), vec![game(Genre::MobileRpg)]);
        let base = now_secs();
        let mut last = None;
        for i in 0..15 {
            let result = analyze_action(
                &harness.state,
                action(
                    "p1",
                    "reward_collection",
                    base + i as f64 * 0.6,
                    ActionValue::Number(100.0),
                ),
            )
            .await
            .expect("result");
            last = Some(result);
        }

        let last = last.expect("last result");
        let rate_violation = last
            .violations
            .iter()
            .find(|v| v.violation_type == ViolationType::RateLimitExceeded)
            .expect("rate limit violation");
        assert!(rate_violation.severity >= 2.0);
        assert!(last.risk_score > 0.0);
    }

    #[tokio::test]
    async fn scripted_fire_cadence_flagged_as_perfect_timing() {
        let harness = build_harness(test_config(), vec![game(Genre::Fps)]);
        let base = now_secs();
        let mut last = None;
        for i in 0..10 {
            let result = analyze_action(
                &harness.state,
                action(
                    "p1",
                    "fire_weapon",
                    base + i as f64 * 2.0,
                    ActionValue::Number(1.0),
                ),
            )
            .await
            .expect("result");
            last = Some(result);
        }

        let last = last.expect("last result");
        let timing = last
            .violations
            .iter()
            .find(|v| v.details.get("pattern_kind") == Some(&json!("perfect_timing")))
            .expect("timing violation");
        assert_eq!(timing.violation_type, ViolationType::SuspiciousPattern);
    }

    #[tokio::test]
    async fn confident_ml_signal_adds_violation() {
        let harness = build_harness(test_config(), vec![game(Genre::Mmorpg)]);
        let mut state = harness.state.clone();
        state.ml_signal = Some(Arc::new(FixedMlSignal { probability: 0.95 }));

        let base = now_secs();
        let mut last = None;
        for i in 0..11 {
            let result = analyze_action(
                &state,
                action(
                    "p1",
                    "gain_exp",
                    base + i as f64 * 10.0,
                    ActionValue::Number(50.0),
                ),
            )
            .await
            .expect("result");
            last = Some(result);
        }

        let last = last.expect("last result");
        let ml = last
            .violations
            .iter()
            .find(|v| v.violation_type == ViolationType::MlDetection)
            .expect("ml violation");
        assert!(ml.severity > 4.0);
        assert_eq!(ml.details["model"], json!("stub-model"));
    }

    #[tokio::test]
    async fn concurrent_actions_for_one_player_never_lose_updates() {
        let harness = build_harness(test_config(), vec![game(Genre::Mmorpg)]);
        let base = now_secs();

        let mut handles = Vec::new();
        for i in 0..20 {
            let state = harness.state.clone();
            handles.push(tokio::spawn(async move {
                analyze_action(
                    &state,
                    action(
                        "p1",
                        "gain_exp",
                        base + i as f64 * 5.0,
                        ActionValue::Number(10.0),
                    ),
                )
                .await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("analysis");
        }

        let key = PlayerKey::new("p1", "g1");
        let player = harness
            .state
            .store
            .get(&key, now_secs())
            .await
            .expect("state");
        assert_eq!(player.window.len(), 20);
    }
}
