// In-memory registry of game profiles
// Profiles are shared as immutable snapshots; mutation is
// clone-modify-replace so readers mid-analysis keep a consistent view.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use warden_domain::GameProfile;

use crate::AppError;

#[derive(Default)]
pub struct ProfileRegistry {
    profiles: RwLock<HashMap<String, Arc<GameProfile>>>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: Vec<GameProfile>) -> Self {
        let map = profiles
            .into_iter()
            .map(|p| (p.game_id.clone(), Arc::new(p)))
            .collect();
        Self {
            profiles: RwLock::new(map),
        }
    }

    pub async fn get(&self, game_id: &str) -> Option<Arc<GameProfile>> {
        self.profiles.read().await.get(game_id).cloned()
    }

    pub async fn contains(&self, game_id: &str) -> bool {
        self.profiles.read().await.contains_key(game_id)
    }

    /// Fails if the game is already registered; check and insert happen
    /// under one write lock so concurrent registrations cannot race.
    pub async fn insert_new(&self, profile: GameProfile) -> Result<Arc<GameProfile>, AppError> {
        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(&profile.game_id) {
            return Err(AppError::DuplicateGame(profile.game_id));
        }
        let shared = Arc::new(profile);
        profiles.insert(shared.game_id.clone(), shared.clone());
        Ok(shared)
    }

    /// Swaps in a new snapshot for an existing game.
    pub async fn replace(&self, profile: GameProfile) -> Arc<GameProfile> {
        let shared = Arc::new(profile);
        self.profiles
            .write()
            .await
            .insert(shared.game_id.clone(), shared.clone());
        shared
    }

    pub async fn list(&self) -> Vec<Arc<GameProfile>> {
        let mut profiles: Vec<Arc<GameProfile>> =
            self.profiles.read().await.values().cloned().collect();
        profiles.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::Genre;

    #[tokio::test]
    async fn duplicate_registration_rejected() {
        let registry = ProfileRegistry::new();
        let profile = GameProfile::new("g1", "One", Genre::Mmorpg, "");
        registry.insert_new(profile.clone()).await.expect("first");
        let err = registry.insert_new(profile).await.expect_err("duplicate");
        assert!(matches!(err, AppError::DuplicateGame(_)));
    }

    #[tokio::test]
    async fn replace_swaps_snapshot_without_touching_readers() {
        let registry = ProfileRegistry::new();
        let profile = GameProfile::new("g1", "One", Genre::Mmorpg, "");
        registry.insert_new(profile).await.expect("insert");
        let before = registry.get("g1").await.expect("profile");

        let mut updated = (*before).clone();
        updated.auto_ban_threshold = 6.0;
        registry.replace(updated).await;

        assert_eq!(before.auto_ban_threshold, 8.0);
        let after = registry.get("g1").await.expect("profile");
        assert_eq!(after.auto_ban_threshold, 6.0);
    }
}
