// Shooter-specific heuristic
// Flags players whose recent headshot ratio is beyond what sustained
// human aim produces. Runs only for shooter genres.

use async_trait::async_trait;
use serde_json::json;
use warden_domain::ports::{DetectionPlugin, PluginMetadata};
use warden_domain::{Action, GameProfile, Genre, PlayerState, Violation, ViolationType};

const MIN_KILLS: usize = 5;
const HEADSHOT_RATIO_LIMIT: f64 = 0.8;
const SEVERITY: f64 = 4.5;

pub struct FpsAimAssistPlugin;

#[async_trait]
impl DetectionPlugin for FpsAimAssistPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(
            "fps_aim_assist",
            "1.0.0",
            "headshot ratio heuristic for shooters",
        )
        .with_genres(&[Genre::Fps, Genre::BattleRoyale])
    }

    async fn detect(
        &self,
        action: &Action,
        state: &PlayerState,
        _profile: &GameProfile,
    ) -> anyhow::Result<Vec<Violation>> {
        // Only re-evaluate when combat happened.
        if action.action_type != "player_kill" && action.action_type != "headshot" {
            return Ok(Vec::new());
        }

        let kills = state
            .window
            .iter()
            .filter(|a| a.action_type == "player_kill")
            .count();
        let headshots = state
            .window
            .iter()
            .filter(|a| a.action_type == "headshot")
            .count();
        if kills < MIN_KILLS {
            return Ok(Vec::new());
        }

        let ratio = headshots as f64 / kills as f64;
        if ratio <= HEADSHOT_RATIO_LIMIT {
            return Ok(Vec::new());
        }

        Ok(vec![Violation::new(
            action.player_id.clone(),
            action.game_id.clone(),
            ViolationType::CustomRule,
            "fps_aim_assist",
            SEVERITY,
            action.timestamp,
        )
        .with_detail("headshot_ratio", json!(ratio))
        .with_detail("kills", json!(kills))
        .with_detail("headshots", json!(headshots))
        .with_detail("ratio_limit", json!(HEADSHOT_RATIO_LIMIT))])
    }
}
