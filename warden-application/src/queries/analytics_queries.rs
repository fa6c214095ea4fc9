use serde_json::json;
use warden_domain::services::risk;
use warden_domain::{now_secs, PlayerKey};

use crate::{AppError, AppState};

/// Fans the player's recent window out to analytics plugins and wraps
/// the reports with the core view of the player.
pub async fn player_analytics(
    state: &AppState,
    player_id: &str,
    game_id: &str,
) -> Result<serde_json::Value, AppError> {
    let profile = state
        .profiles
        .get(game_id)
        .await
        .ok_or_else(|| AppError::ProfileNotFound(game_id.to_string()))?;

    let now = now_secs();
    let key = PlayerKey::new(player_id, game_id);
    let _guard = state.store.lock_key(&key).await;
    let player = state.store.get(&key, now).await?;

    let reports = state
        .plugins
        .analytics(profile.genre, &key, &player.window)
        .await;

    Ok(json!({
        "player_id": player_id,
        "game_id": game_id,
        "window_size": player.window.len(),
        "risk_score": risk::decayed_score(
            player.cumulative_risk_score,
            player.last_action_secs,
            now,
        ),
        "reports": serde_json::Value::Object(reports),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;

    use crate::test_support::{build_harness_with, test_config, PluginHostSetup};
    use warden_domain::ports::{AnalyticsPlugin, PluginMetadata};
    use warden_domain::services::rule_engine::RuleEngine;
    use warden_domain::{Action, GameProfile, Genre};

    struct WindowCounter;

    #[async_trait]
    impl AnalyticsPlugin for WindowCounter {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata::new("window_counter", "1.0.0", "counts window entries")
        }

        async fn analyze(
            &self,
            _key: &PlayerKey,
            window: &[Action],
        ) -> anyhow::Result<serde_json::Value> {
            Ok(json!({ "count": window.len() }))
        }
    }

    #[tokio::test]
    async fn reports_are_keyed_by_plugin_name() {
        let profile = GameProfile::new("g1", "One", Genre::Sandbox, "");
        let harness = build_harness_with(
            test_config(),
            vec![profile],
            RuleEngine::new(),
            PluginHostSetup {
                configure: Some(Box::new(|host| {
                    host.register_analytics(Arc::new(WindowCounter));
                })),
            },
        );

        let report = player_analytics(&harness.state, "p1", "g1")
            .await
            .expect("report");
        assert_eq!(report["reports"]["window_counter"]["count"], json!(0));
        assert_eq!(report["risk_score"], json!(0.0));
    }
}
