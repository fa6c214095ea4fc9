// In-process warm tier
// Serialized snapshots with a TTL, standing in for an external cache
// cluster. Going through JSON keeps the boundary honest: anything that
// cannot survive serialization never silently depends on it.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use warden_domain::ports::WarmCache;
use warden_domain::{now_secs, PlayerKey, PlayerState};

#[derive(Default)]
pub struct LocalWarmCache {
    entries: RwLock<HashMap<PlayerKey, SnapshotEntry>>,
}

struct SnapshotEntry {
    payload: String,
    expires_secs: f64,
}

impl LocalWarmCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl WarmCache for LocalWarmCache {
    async fn get(&self, key: &PlayerKey) -> anyhow::Result<Option<PlayerState>> {
        let now = now_secs();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_secs > now => {
                let state: PlayerState = serde_json::from_str(&entry.payload)?;
                Ok(Some(state))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, state: &PlayerState, ttl_secs: u64) -> anyhow::Result<()> {
        let key = PlayerKey::new(state.player_id.clone(), state.game_id.clone());
        let payload = serde_json::to_string(state)?;
        self.entries.write().await.insert(
            key,
            SnapshotEntry {
                payload,
                expires_secs: now_secs() + ttl_secs as f64,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &PlayerKey) -> anyhow::Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_round_trip_preserves_state() {
        let cache = LocalWarmCache::new();
        let mut state = PlayerState::new("p1", "g1", 100.0);
        state.cumulative_risk_score = 4.5;
        cache.put(&state, 3600).await.expect("put");

        let key = PlayerKey::new("p1", "g1");
        let restored = cache.get(&key).await.expect("get").expect("hit");
        assert_eq!(restored.cumulative_risk_score, 4.5);
        assert_eq!(restored.player_id, "p1");
    }

    #[tokio::test]
    async fn expired_snapshot_is_a_miss() {
        let cache = LocalWarmCache::new();
        let state = PlayerState::new("p1", "g1", 100.0);
        cache.put(&state, 0).await.expect("put");

        let key = PlayerKey::new("p1", "g1");
        assert!(cache.get(&key).await.expect("get").is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn remove_clears_entry() {
        let cache = LocalWarmCache::new();
        let state = PlayerState::new("p1", "g1", 100.0);
        cache.put(&state, 3600).await.expect("put");
        let key = PlayerKey::new("p1", "g1");
        cache.remove(&key).await.expect("remove");
        assert!(cache.get(&key).await.expect("get").is_none());
    }
}
