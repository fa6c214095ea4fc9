use warden_domain::services::risk;
use warden_domain::{now_secs, PlayerKey};

use crate::{AppError, AppState};

/// Current decayed score without mutating anything but access time.
pub async fn get_player_risk_score(
    state: &AppState,
    player_id: &str,
    game_id: &str,
) -> Result<f64, AppError> {
    if !state.profiles.contains(game_id).await {
        return Err(AppError::ProfileNotFound(game_id.to_string()));
    }
    let now = now_secs();
    let key = PlayerKey::new(player_id, game_id);
    let _guard = state.store.lock_key(&key).await;
    let player = state.store.get(&key, now).await?;
    Ok(risk::decayed_score(
        player.cumulative_risk_score,
        player.last_action_secs,
        now,
    ))
}

pub async fn should_ban(
    state: &AppState,
    player_id: &str,
    game_id: &str,
) -> Result<(bool, Option<String>), AppError> {
    let profile = state
        .profiles
        .get(game_id)
        .await
        .ok_or_else(|| AppError::ProfileNotFound(game_id.to_string()))?;
    let now = now_secs();
    let key = PlayerKey::new(player_id, game_id);
    let _guard = state.store.lock_key(&key).await;
    let player = state.store.get(&key, now).await?;
    let assessment = risk::assess(&player, &profile, &state.ban_policy(), now);
    Ok((assessment.should_ban, assessment.reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_harness, test_config};
    use warden_domain::{GameProfile, Genre, Violation, ViolationType};

    #[tokio::test]
    async fn unseen_player_scores_zero() {
        let profile = GameProfile::new("g1", "One", Genre::Sandbox, "");
        let harness = build_harness(test_config(), vec![profile]);
        let score = get_player_risk_score(&harness.state, "p1", "g1")
            .await
            .expect("score");
        assert_eq!(score, 0.0);
        let (ban, reason) = should_ban(&harness.state, "p1", "g1").await.expect("ban");
        assert!(!ban);
        assert!(reason.is_none());
    }

    #[tokio::test]
    async fn high_score_recommends_ban_with_reason() {
        let profile = GameProfile::new("g1", "One", Genre::Sandbox, "");
        let harness = build_harness(test_config(), vec![profile]);

        let now = now_secs();
        let key = PlayerKey::new("p1", "g1");
        let mut player = harness.state.store.get(&key, now).await.expect("state");
        let violations: Vec<Violation> = (0..2)
            .map(|i| {
                Violation::new(
                    "p1",
                    "g1",
                    ViolationType::ThresholdExceeded,
                    "r1",
                    5.0,
                    now + i as f64,
                )
            })
            .collect();
        player.record_violations(&violations, now);
        player.last_action_secs = now;
        harness
            .state
            .store
            .commit(player, None, violations, now)
            .await;

        let (ban, reason) = should_ban(&harness.state, "p1", "g1").await.expect("ban");
        assert!(ban);
        assert!(reason.expect("reason").contains("threshold"));
    }

    #[tokio::test]
    async fn unknown_game_rejected() {
        let harness = build_harness(test_config(), Vec::new());
        let err = get_player_risk_score(&harness.state, "p1", "missing")
            .await
            .expect_err("no game");
        assert!(matches!(err, AppError::ProfileNotFound(_)));
    }
}
