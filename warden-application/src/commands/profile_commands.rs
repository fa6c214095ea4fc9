// Profile administration
// Registration seeds genre defaults; later edits clone the current
// snapshot, validate, persist, then swap the registry entry.

use std::sync::Arc;

use tracing::info;
use warden_domain::services::genre_defaults::apply_genre_defaults;
use warden_domain::{ActionDefinition, DetectionRule, GameProfile, Genre};

use crate::{AppError, AppState};

pub async fn register_game(
    state: &AppState,
    game_id: &str,
    name: &str,
    genre: &str,
    description: &str,
) -> Result<Arc<GameProfile>, AppError> {
    let game_id = game_id.trim();
    if game_id.is_empty() {
        return Err(AppError::BadRequest("game_id must not be empty".to_string()));
    }
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("game name must not be empty".to_string()));
    }
    if state.profiles.contains(game_id).await {
        return Err(AppError::DuplicateGame(game_id.to_string()));
    }

    let genre = Genre::parse_or_sandbox(genre);
    let mut profile = GameProfile::new(game_id, name.trim(), genre, description);
    apply_genre_defaults(&mut profile);

    state.profile_repo.save(&profile).await?;
    let shared = state.profiles.insert_new(profile).await?;
    info!(
        "registered game {} ({}) with {} actions and {} rules",
        shared.game_id,
        shared.genre.as_str(),
        shared.actions.len(),
        shared.detection_rules.len()
    );
    Ok(shared)
}

pub async fn add_action_definition(
    state: &AppState,
    game_id: &str,
    definition: ActionDefinition,
) -> Result<Arc<GameProfile>, AppError> {
    definition
        .validate()
        .map_err(AppError::InvalidDefinition)?;
    let current = state
        .profiles
        .get(game_id)
        .await
        .ok_or_else(|| AppError::ProfileNotFound(game_id.to_string()))?;

    let mut updated = (*current).clone();
    updated.add_action(definition);
    state.profile_repo.save(&updated).await?;
    Ok(state.profiles.replace(updated).await)
}

pub async fn add_detection_rule(
    state: &AppState,
    game_id: &str,
    rule: DetectionRule,
) -> Result<Arc<GameProfile>, AppError> {
    rule.validate().map_err(AppError::InvalidDefinition)?;
    let current = state
        .profiles
        .get(game_id)
        .await
        .ok_or_else(|| AppError::ProfileNotFound(game_id.to_string()))?;
    if current.has_rule(&rule.rule_id) {
        return Err(AppError::InvalidDefinition(format!(
            "rule {} already exists for {}",
            rule.rule_id, game_id
        )));
    }

    let mut updated = (*current).clone();
    updated.add_rule(rule);
    state.profile_repo.save(&updated).await?;
    Ok(state.profiles.replace(updated).await)
}

pub async fn set_rule_enabled(
    state: &AppState,
    game_id: &str,
    rule_id: &str,
    enabled: bool,
) -> Result<Arc<GameProfile>, AppError> {
    let current = state
        .profiles
        .get(game_id)
        .await
        .ok_or_else(|| AppError::ProfileNotFound(game_id.to_string()))?;

    let mut updated = (*current).clone();
    let rule = updated
        .detection_rules
        .iter_mut()
        .find(|r| r.rule_id == rule_id)
        .ok_or_else(|| {
            AppError::BadRequest(format!("no rule {rule_id} for game {game_id}"))
        })?;
    rule.enabled = enabled;
    state.profile_repo.save(&updated).await?;
    Ok(state.profiles.replace(updated).await)
}
