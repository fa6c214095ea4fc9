use std::sync::Arc;

use serde::Serialize;
use warden_domain::GameProfile;

use crate::{AppError, AppState};

#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub name: String,
    pub genre: String,
    pub action_count: usize,
    pub rule_count: usize,
}

pub async fn get_game_profile(
    state: &AppState,
    game_id: &str,
) -> Result<Arc<GameProfile>, AppError> {
    state
        .profiles
        .get(game_id)
        .await
        .ok_or_else(|| AppError::ProfileNotFound(game_id.to_string()))
}

pub async fn list_games(state: &AppState) -> Vec<GameSummary> {
    state
        .profiles
        .list()
        .await
        .into_iter()
        .map(|profile| GameSummary {
            game_id: profile.game_id.clone(),
            name: profile.name.clone(),
            genre: profile.genre.as_str().to_string(),
            action_count: profile.actions.len(),
            rule_count: profile.detection_rules.len(),
        })
        .collect()
}
