use async_trait::async_trait;

use crate::entities::Action;
use crate::value_objects::PlayerKey;

#[derive(Debug, Clone)]
pub struct MlScore {
    /// Probability that the recent window is cheating behavior.
    pub probability: f64,
    pub confidence: f64,
    pub model_name: String,
}

/// Optional external anomaly model. `None` means the model had no
/// opinion; errors and timeouts are treated the same way upstream.
#[async_trait]
pub trait MlSignalSource: Send + Sync {
    async fn score(&self, key: &PlayerKey, window: &[Action]) -> anyhow::Result<Option<MlScore>>;
}
