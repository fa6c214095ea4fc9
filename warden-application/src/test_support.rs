// In-memory port implementations shared by unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use warden_domain::ports::{
    ActionRepository, MlScore, MlSignalSource, ProfileRepository, RiskScoreRecord, WarmCache,
};
use warden_domain::services::rule_engine::RuleEngine;
use warden_domain::{Action, GameProfile, PlayerKey, PlayerState, RuntimeConfig, Violation};

use crate::{AppState, Metrics, PlayerStateStore, PluginHost, ProfileRegistry};

pub fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        memory_max_players: 1000,
        memory_ttl_secs: 300,
        warm_ttl_secs: 3600,
        lookback_secs: 3600,
        lookback_limit: 100,
        notify_min_severity: 4.0,
        ml_probability_threshold: 0.8,
        plugin_timeout_ms: 100,
        ml_timeout_ms: 100,
        severe_override_enabled: true,
        severe_override_count: 3,
        severe_override_min_severity: 4.0,
        severe_override_window_secs: 3600,
        sweep_interval_secs: 60,
        profiles_dir: "profiles".to_string(),
        persist_retry_max_attempts: 3,
        persist_retry_base_ms: 10,
        webhook_url: None,
        webhook_timeout_secs: 5,
    }
}

#[derive(Default)]
pub struct MemoryActionRepository {
    actions: Mutex<Vec<Action>>,
    violations: Mutex<Vec<Violation>>,
    scores: Mutex<HashMap<PlayerKey, RiskScoreRecord>>,
    failures_remaining: Mutex<u32>,
}

impl MemoryActionRepository {
    pub async fn seed_actions(&self, actions: Vec<Action>) {
        self.actions.lock().await.extend(actions);
    }

    pub async fn seed_score(&self, key: &PlayerKey, score: f64, updated_secs: f64) {
        self.scores
            .lock()
            .await
            .insert(key.clone(), RiskScoreRecord { score, updated_secs });
    }

    pub async fn fail_next(&self, count: u32) {
        *self.failures_remaining.lock().await = count;
    }

    pub async fn score_of(&self, key: &PlayerKey) -> Option<f64> {
        self.scores.lock().await.get(key).map(|r| r.score)
    }

    pub async fn violation_count(&self) -> usize {
        self.violations.lock().await.len()
    }

    pub async fn action_count(&self) -> usize {
        self.actions.lock().await.len()
    }

    async fn check_failure(&self) -> anyhow::Result<()> {
        let mut remaining = self.failures_remaining.lock().await;
        if *remaining > 0 {
            *remaining -= 1;
            anyhow::bail!("injected failure");
        }
        Ok(())
    }
}

#[async_trait]
impl ActionRepository for MemoryActionRepository {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn append_action(&self, action: &Action) -> anyhow::Result<()> {
        self.check_failure().await?;
        self.actions.lock().await.push(action.clone());
        Ok(())
    }

    async fn load_recent_actions(
        &self,
        key: &PlayerKey,
        _lookback_secs: f64,
        limit: usize,
    ) -> anyhow::Result<Vec<Action>> {
        let mut matching: Vec<Action> = self
            .actions
            .lock()
            .await
            .iter()
            .filter(|a| a.player_id == key.player_id && a.game_id == key.game_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.timestamp
                .partial_cmp(&b.timestamp)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.split_off(skip))
    }

    async fn insert_violations(&self, violations: &[Violation]) -> anyhow::Result<()> {
        self.violations.lock().await.extend_from_slice(violations);
        Ok(())
    }

    async fn load_score(&self, key: &PlayerKey) -> anyhow::Result<Option<RiskScoreRecord>> {
        Ok(self.scores.lock().await.get(key).copied())
    }

    async fn upsert_score(
        &self,
        key: &PlayerKey,
        score: f64,
        updated_secs: f64,
    ) -> anyhow::Result<()> {
        self.check_failure().await?;
        self.scores
            .lock()
            .await
            .insert(key.clone(), RiskScoreRecord { score, updated_secs });
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct FailingActionRepository;

#[async_trait]
impl ActionRepository for FailingActionRepository {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        anyhow::bail!("durable store down")
    }

    async fn append_action(&self, _action: &Action) -> anyhow::Result<()> {
        anyhow::bail!("durable store down")
    }

    async fn load_recent_actions(
        &self,
        _key: &PlayerKey,
        _lookback_secs: f64,
        _limit: usize,
    ) -> anyhow::Result<Vec<Action>> {
        anyhow::bail!("durable store down")
    }

    async fn insert_violations(&self, _violations: &[Violation]) -> anyhow::Result<()> {
        anyhow::bail!("durable store down")
    }

    async fn load_score(&self, _key: &PlayerKey) -> anyhow::Result<Option<RiskScoreRecord>> {
        anyhow::bail!("durable store down")
    }

    async fn upsert_score(
        &self,
        _key: &PlayerKey,
        _score: f64,
        _updated_secs: f64,
    ) -> anyhow::Result<()> {
        anyhow::bail!("durable store down")
    }

    async fn ping(&self) -> anyhow::Result<()> {
        anyhow::bail!("durable store down")
    }
}

#[derive(Default)]
pub struct MemoryWarmCache {
    entries: Mutex<HashMap<PlayerKey, PlayerState>>,
}

impl MemoryWarmCache {
    pub async fn contains(&self, key: &PlayerKey) -> bool {
        self.entries.lock().await.contains_key(key)
    }
}

#[async_trait]
impl WarmCache for MemoryWarmCache {
    async fn get(&self, key: &PlayerKey) -> anyhow::Result<Option<PlayerState>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, state: &PlayerState, _ttl_secs: u64) -> anyhow::Result<()> {
        let key = PlayerKey::new(state.player_id.clone(), state.game_id.clone());
        self.entries.lock().await.insert(key, state.clone());
        Ok(())
    }

    async fn remove(&self, key: &PlayerKey) -> anyhow::Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

pub struct UnavailableWarmCache;

#[async_trait]
impl WarmCache for UnavailableWarmCache {
    async fn get(&self, _key: &PlayerKey) -> anyhow::Result<Option<PlayerState>> {
        anyhow::bail!("warm tier down")
    }

    async fn put(&self, _state: &PlayerState, _ttl_secs: u64) -> anyhow::Result<()> {
        anyhow::bail!("warm tier down")
    }

    async fn remove(&self, _key: &PlayerKey) -> anyhow::Result<()> {
        anyhow::bail!("warm tier down")
    }
}

#[derive(Default)]
pub struct MemoryProfileRepository {
    profiles: Mutex<HashMap<String, GameProfile>>,
}

impl MemoryProfileRepository {
    pub async fn saved_count(&self) -> usize {
        self.profiles.lock().await.len()
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn save(&self, profile: &GameProfile) -> anyhow::Result<()> {
        self.profiles
            .lock()
            .await
            .insert(profile.game_id.clone(), profile.clone());
        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<GameProfile>> {
        Ok(self.profiles.lock().await.values().cloned().collect())
    }
}

/// Fixed-probability model stub.
pub struct FixedMlSignal {
    pub probability: f64,
}

#[async_trait]
impl MlSignalSource for FixedMlSignal {
    async fn score(
        &self,
        _key: &PlayerKey,
        _window: &[Action],
    ) -> anyhow::Result<Option<MlScore>> {
        Ok(Some(MlScore {
            probability: self.probability,
            confidence: 0.9,
            model_name: "stub-model".to_string(),
        }))
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub action_repo: Arc<MemoryActionRepository>,
    pub profile_repo: Arc<MemoryProfileRepository>,
    pub warm: Arc<MemoryWarmCache>,
}

pub fn build_harness(config: RuntimeConfig, profiles: Vec<GameProfile>) -> TestHarness {
    build_harness_with(config, profiles, RuleEngine::new(), PluginHostSetup::default())
}

#[derive(Default)]
pub struct PluginHostSetup {
    pub configure: Option<Box<dyn FnOnce(&mut PluginHost) + Send>>,
}

pub fn build_harness_with(
    config: RuntimeConfig,
    profiles: Vec<GameProfile>,
    rule_engine: RuleEngine,
    plugin_setup: PluginHostSetup,
) -> TestHarness {
    let metrics = Arc::new(Metrics::default());
    let warm = Arc::new(MemoryWarmCache::default());
    let action_repo = Arc::new(MemoryActionRepository::default());
    let profile_repo = Arc::new(MemoryProfileRepository::default());
    let store = Arc::new(PlayerStateStore::new(
        config.clone(),
        warm.clone(),
        action_repo.clone(),
        metrics.clone(),
    ));
    let mut plugins = PluginHost::new(config.plugin_timeout_ms, metrics.clone());
    if let Some(configure) = plugin_setup.configure {
        configure(&mut plugins);
    }
    let state = AppState {
        config,
        profiles: Arc::new(ProfileRegistry::from_profiles(profiles)),
        store,
        action_repo: action_repo.clone(),
        profile_repo: profile_repo.clone(),
        rule_engine: Arc::new(rule_engine),
        plugins: Arc::new(plugins),
        ml_signal: None,
        metrics,
    };
    TestHarness {
        state,
        action_repo,
        profile_repo,
        warm,
    }
}
