// Tiered player state store
// Memory tier for hot players, warm tier for recently idle ones, the
// durable store as the tier of last resort. A single live entry per
// player moves between tiers; per-key async locks serialize writers so
// concurrent actions for one player never interleave.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, warn};
use warden_domain::ports::{ActionRepository, WarmCache};
use warden_domain::{Action, PlayerKey, PlayerState, RuntimeConfig, Violation};

use crate::{AppError, Metrics};

pub struct PlayerStateStore {
    config: RuntimeConfig,
    memory: RwLock<HashMap<PlayerKey, PlayerState>>,
    locks: Mutex<HashMap<PlayerKey, Arc<Mutex<()>>>>,
    warm: Arc<dyn WarmCache>,
    durable: Arc<dyn ActionRepository>,
    metrics: Arc<Metrics>,
}

impl PlayerStateStore {
    pub fn new(
        config: RuntimeConfig,
        warm: Arc<dyn WarmCache>,
        durable: Arc<dyn ActionRepository>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            config,
            memory: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
            warm,
            durable,
            metrics,
        }
    }

    /// Acquires the per-player lock. Callers hold the guard across the
    /// whole read-analyze-commit sequence.
    pub async fn lock_key(&self, key: &PlayerKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    async fn try_lock_key(&self, key: &PlayerKey) -> Option<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.try_lock_owned().ok()
    }

    /// Loads the player's state, promoting warm-tier snapshots and
    /// reconstructing from the durable tier on a full miss. A missing
    /// player everywhere yields a fresh zero-score state.
    pub async fn get(&self, key: &PlayerKey, now: f64) -> Result<PlayerState, AppError> {
        if let Some(state) = self.memory.write().await.get_mut(key) {
            state.touch(now);
            return Ok(state.clone());
        }

        match self.warm.get(key).await {
            Ok(Some(mut state)) => {
                state.touch(now);
                self.memory.write().await.insert(key.clone(), state.clone());
                if let Err(err) = self.warm.remove(key).await {
                    warn!("warm tier remove failed for {}: {err}", key);
                }
                self.demote_lru_quartile().await;
                return Ok(state);
            }
            Ok(None) => {}
            // Warm tier failures degrade to the durable tier.
            Err(err) => warn!("warm tier read failed for {}: {err}", key),
        }

        let score = self
            .durable
            .load_score(key)
            .await
            .map_err(|err| AppError::StoreUnavailable(err.to_string()))?;
        let actions = self
            .durable
            .load_recent_actions(key, self.config.lookback_secs as f64, self.config.lookback_limit)
            .await
            .map_err(|err| AppError::StoreUnavailable(err.to_string()))?;

        let state = PlayerState::from_history(
            &key.player_id,
            &key.game_id,
            actions,
            score.map(|record| record.score).unwrap_or(0.0),
            now,
        );
        self.memory.write().await.insert(key.clone(), state.clone());
        self.demote_lru_quartile().await;
        Ok(state)
    }

    /// Writes the updated state back to the memory tier and persists
    /// the action, violations and score checkpoint in the background.
    /// Persistence failures degrade durability, never the analysis.
    pub async fn commit(
        self: &Arc<Self>,
        state: PlayerState,
        action: Option<Action>,
        violations: Vec<Violation>,
        now: f64,
    ) {
        let key = PlayerKey::new(state.player_id.clone(), state.game_id.clone());
        let score = state.cumulative_risk_score;
        self.memory.write().await.insert(key.clone(), state);
        self.demote_lru_quartile().await;

        let store = Arc::clone(self);
        tokio::spawn(async move {
            store
                .persist_with_retry(&key, action.as_ref(), &violations, score, now)
                .await;
        });
    }

    pub(crate) async fn persist_with_retry(
        &self,
        key: &PlayerKey,
        action: Option<&Action>,
        violations: &[Violation],
        score: f64,
        now: f64,
    ) {
        let mut attempt: u32 = 0;
        loop {
            match self.persist_once(key, action, violations, score, now).await {
                Ok(()) => return,
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.config.persist_retry_max_attempts.max(1) {
                        warn!("giving up on persisting {} after {attempt} attempts: {err}", key);
                        return;
                    }
                    self.metrics.record_persistence_retry();
                    let backoff = self
                        .config
                        .persist_retry_base_ms
                        .saturating_mul(1u64 << (attempt - 1).min(6));
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
            }
        }
    }

    async fn persist_once(
        &self,
        key: &PlayerKey,
        action: Option<&Action>,
        violations: &[Violation],
        score: f64,
        now: f64,
    ) -> anyhow::Result<()> {
        if let Some(action) = action {
            self.durable.append_action(action).await?;
        }
        if !violations.is_empty() {
            self.durable.insert_violations(violations).await?;
        }
        self.durable.upsert_score(key, score, now).await?;
        Ok(())
    }

    /// Demotes the least-recently-accessed quartile once the memory
    /// tier exceeds its capacity. Entries whose key lock is held are
    /// active and skipped.
    async fn demote_lru_quartile(&self) {
        let candidates: Vec<PlayerKey> = {
            let memory = self.memory.read().await;
            if memory.len() <= self.config.memory_max_players {
                return;
            }
            let mut entries: Vec<(PlayerKey, f64)> = memory
                .iter()
                .map(|(key, state)| (key.clone(), state.last_access_secs))
                .collect();
            entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            entries.truncate((entries.len() / 4).max(1));
            entries.into_iter().map(|(key, _)| key).collect()
        };
        for key in candidates {
            self.demote(&key).await;
        }
    }

    async fn demote(&self, key: &PlayerKey) {
        let _guard = match self.try_lock_key(key).await {
            Some(guard) => guard,
            None => return,
        };
        let Some(state) = self.memory.write().await.remove(key) else {
            return;
        };
        if let Err(err) = self.warm.put(&state, self.config.warm_ttl_secs).await {
            // Dropping the only live copy would lose window and score.
            warn!("warm demotion failed for {}, keeping entry in memory: {err}", key);
            self.memory.write().await.insert(key.clone(), state);
        } else {
            debug!("demoted {} to warm tier", key);
        }
    }

    /// Periodic maintenance: demote idle entries and drop unused
    /// per-key locks.
    pub async fn sweep(&self, now: f64) {
        let idle: Vec<PlayerKey> = {
            let memory = self.memory.read().await;
            memory
                .iter()
                .filter(|(_, state)| {
                    now - state.last_access_secs > self.config.memory_ttl_secs as f64
                })
                .map(|(key, _)| key.clone())
                .collect()
        };
        let idle_count = idle.len();
        for key in idle {
            self.demote(&key).await;
        }
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        if idle_count > 0 {
            debug!("sweep demoted {idle_count} idle entries");
        }
    }

    pub async fn memory_len(&self) -> usize {
        self.memory.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn contains_memory(&self, key: &PlayerKey) -> bool {
        self.memory.read().await.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        test_config, FailingActionRepository, MemoryActionRepository, MemoryWarmCache,
        UnavailableWarmCache,
    };
    use warden_domain::ActionValue;

    fn sample_action(player: &str, ts: f64) -> Action {
        Action {
            player_id: player.to_string(),
            game_id: "g1".to_string(),
            action_type: "gain_exp".to_string(),
            timestamp: ts,
            value: ActionValue::Number(10.0),
            metadata: Default::default(),
            session_id: None,
        }
    }

    fn build_store(config: RuntimeConfig) -> (Arc<PlayerStateStore>, Arc<MemoryWarmCache>, Arc<MemoryActionRepository>) {
        let warm = Arc::new(MemoryWarmCache::default());
        let durable = Arc::new(MemoryActionRepository::default());
        let store = Arc::new(PlayerStateStore::new(
            config,
            warm.clone(),
            durable.clone(),
            Arc::new(Metrics::default()),
        ));
        (store, warm, durable)
    }

    #[tokio::test]
    async fn miss_everywhere_yields_fresh_state() {
        let (store, _, _) = build_store(test_config());
        let key = PlayerKey::new("p1", "g1");
        let state = store.get(&key, 100.0).await.expect("state");
        assert_eq!(state.cumulative_risk_score, 0.0);
        assert!(state.window.is_empty());
    }

    #[tokio::test]
    async fn sweep_demotes_idle_and_get_promotes_back() {
        let mut config = test_config();
        config.memory_ttl_secs = 60;
        let (store, warm, _) = build_store(config);
        let key = PlayerKey::new("p1", "g1");

        let mut state = store.get(&key, 100.0).await.expect("state");
        state.apply_action(sample_action("p1", 100.0));
        store.commit(state, None, Vec::new(), 100.0).await;

        store.sweep(100.0 + 120.0).await;
        assert!(!store.contains_memory(&key).await);
        assert!(warm.contains(&key).await);

        let promoted = store.get(&key, 100.0 + 130.0).await.expect("state");
        assert_eq!(promoted.window.len(), 1);
        assert!(store.contains_memory(&key).await);
        assert!(!warm.contains(&key).await);
    }

    #[tokio::test]
    async fn capacity_overflow_demotes_lru_quartile() {
        let mut config = test_config();
        config.memory_max_players = 4;
        let (store, warm, _) = build_store(config);

        for i in 0..8 {
            let key = PlayerKey::new(format!("p{i}"), "g1");
            let state = store.get(&key, 100.0 + i as f64).await.expect("state");
            store.commit(state, None, Vec::new(), 100.0 + i as f64).await;
        }

        assert!(store.memory_len().await < 8);
        // The earliest-accessed player went to the warm tier first.
        assert!(warm.contains(&PlayerKey::new("p0", "g1")).await);
    }

    #[tokio::test]
    async fn durable_reconstruction_replays_history() {
        let (store, _, durable) = build_store(test_config());
        let key = PlayerKey::new("p1", "g1");
        durable.seed_actions(vec![sample_action("p1", 50.0), sample_action("p1", 60.0)]).await;
        durable.seed_score(&key, 3.5, 60.0).await;

        let state = store.get(&key, 100.0).await.expect("state");
        assert_eq!(state.window.len(), 2);
        assert_eq!(state.cumulative_risk_score, 3.5);
    }

    #[tokio::test]
    async fn warm_failure_degrades_to_durable() {
        let durable = Arc::new(MemoryActionRepository::default());
        let key = PlayerKey::new("p1", "g1");
        durable.seed_score(&key, 2.0, 50.0).await;
        let store = Arc::new(PlayerStateStore::new(
            test_config(),
            Arc::new(UnavailableWarmCache),
            durable,
            Arc::new(Metrics::default()),
        ));
        let state = store.get(&key, 100.0).await.expect("state");
        assert_eq!(state.cumulative_risk_score, 2.0);
    }

    #[tokio::test]
    async fn durable_failure_surfaces_store_unavailable() {
        let store = Arc::new(PlayerStateStore::new(
            test_config(),
            Arc::new(MemoryWarmCache::default()),
            Arc::new(FailingActionRepository),
            Arc::new(Metrics::default()),
        ));
        let err = store
            .get(&PlayerKey::new("p1", "g1"), 100.0)
            .await
            .expect_err("failure");
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn persist_retry_eventually_succeeds() {
        let durable = Arc::new(MemoryActionRepository::default());
        durable.fail_next(2).await;
        let metrics = Arc::new(Metrics::default());
        let mut config = test_config();
        config.persist_retry_base_ms = 1;
        let store = Arc::new(PlayerStateStore::new(
            config,
            Arc::new(MemoryWarmCache::default()),
            durable.clone(),
            metrics,
        ));
        let key = PlayerKey::new("p1", "g1");
        store
            .persist_with_retry(&key, Some(&sample_action("p1", 10.0)), &[], 1.0, 10.0)
            .await;
        assert_eq!(durable.score_of(&key).await, Some(1.0));
    }

    #[tokio::test]
    async fn key_lock_serializes_writers() {
        let (store, _, _) = build_store(test_config());
        let key = PlayerKey::new("p1", "g1");
        let guard = store.lock_key(&key).await;
        assert!(store.try_lock_key(&key).await.is_none());
        drop(guard);
        assert!(store.try_lock_key(&key).await.is_some());
    }
}
