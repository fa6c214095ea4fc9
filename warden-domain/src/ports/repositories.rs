use async_trait::async_trait;

use crate::entities::{Action, GameProfile, PlayerState, Violation};
use crate::value_objects::PlayerKey;

/// Last persisted risk score for a player, with its update time.
#[derive(Debug, Clone, Copy)]
pub struct RiskScoreRecord {
    pub score: f64,
    pub updated_secs: f64,
}

/// Durable tier: append-only action history, violation audit trail and
/// risk score checkpoints.
#[async_trait]
pub trait ActionRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn append_action(&self, action: &Action) -> anyhow::Result<()>;
    /// Recent history for one player, ordered by event time ascending.
    async fn load_recent_actions(
        &self,
        key: &PlayerKey,
        lookback_secs: f64,
        limit: usize,
    ) -> anyhow::Result<Vec<Action>>;
    async fn insert_violations(&self, violations: &[Violation]) -> anyhow::Result<()>;
    async fn load_score(&self, key: &PlayerKey) -> anyhow::Result<Option<RiskScoreRecord>>;
    async fn upsert_score(
        &self,
        key: &PlayerKey,
        score: f64,
        updated_secs: f64,
    ) -> anyhow::Result<()>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn save(&self, profile: &GameProfile) -> anyhow::Result<()>;
    async fn load_all(&self) -> anyhow::Result<Vec<GameProfile>>;
}

/// Warm tier: TTL'd snapshots of demoted player state. Failures here
/// are degradations, not hard errors; callers fall through to the
/// durable tier.
#[async_trait]
pub trait WarmCache: Send + Sync {
    async fn get(&self, key: &PlayerKey) -> anyhow::Result<Option<PlayerState>>;
    async fn put(&self, state: &PlayerState, ttl_secs: u64) -> anyhow::Result<()>;
    async fn remove(&self, key: &PlayerKey) -> anyhow::Result<()>;
}
