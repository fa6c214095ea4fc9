use async_trait::async_trait;

use crate::entities::{Action, GameProfile, PlayerState, Violation};
use crate::value_objects::{Genre, PlayerKey};

#[derive(Debug, Clone)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Empty means the plugin applies to every genre.
    pub genres: Vec<Genre>,
}

impl PluginMetadata {
    pub fn new(name: &str, version: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            description: description.to_string(),
            genres: Vec::new(),
        }
    }

    pub fn with_genres(mut self, genres: &[Genre]) -> Self {
        self.genres = genres.to_vec();
        self
    }

    pub fn applies_to(&self, genre: Genre) -> bool {
        self.genres.is_empty() || self.genres.contains(&genre)
    }
}

/// Runs before validation and analysis; may rewrite the action or drop
/// it entirely by returning `None`. After evaluation the same plugin
/// may rewrite the violation set before it is scored.
#[async_trait]
pub trait PreProcessingPlugin: Send + Sync {
    fn metadata(&self) -> PluginMetadata;
    async fn process(&self, action: Action, profile: &GameProfile)
        -> anyhow::Result<Option<Action>>;

    /// Default is a pass-through; override to suppress or annotate
    /// violations (deduplication, trusted-player allowlists).
    async fn post_process(
        &self,
        violations: Vec<Violation>,
        _profile: &GameProfile,
    ) -> anyhow::Result<Vec<Violation>> {
        Ok(violations)
    }
}

/// Contributes extra violations after the rule engine has run.
#[async_trait]
pub trait DetectionPlugin: Send + Sync {
    fn metadata(&self) -> PluginMetadata;
    async fn detect(
        &self,
        action: &Action,
        state: &PlayerState,
        profile: &GameProfile,
    ) -> anyhow::Result<Vec<Violation>>;
}

#[async_trait]
pub trait NotificationPlugin: Send + Sync {
    fn metadata(&self) -> PluginMetadata;
    async fn notify(&self, violation: &Violation) -> anyhow::Result<()>;
}

/// Read-only aggregation over a player's recent window.
#[async_trait]
pub trait AnalyticsPlugin: Send + Sync {
    fn metadata(&self) -> PluginMetadata;
    async fn analyze(
        &self,
        key: &PlayerKey,
        window: &[Action],
    ) -> anyhow::Result<serde_json::Value>;
}
