use std::sync::Arc;

use warden_domain::ports::{ActionRepository, MlSignalSource, ProfileRepository};
use warden_domain::services::risk::BanPolicy;
use warden_domain::services::rule_engine::RuleEngine;
use warden_domain::RuntimeConfig;

use crate::{Metrics, PlayerStateStore, PluginHost, ProfileRegistry};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub profiles: Arc<ProfileRegistry>,
    pub store: Arc<PlayerStateStore>,
    pub action_repo: Arc<dyn ActionRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub rule_engine: Arc<RuleEngine>,
    pub plugins: Arc<PluginHost>,
    pub ml_signal: Option<Arc<dyn MlSignalSource>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn ban_policy(&self) -> BanPolicy {
        BanPolicy {
            severe_override_enabled: self.config.severe_override_enabled,
            severe_count: self.config.severe_override_count,
            severe_min_severity: self.config.severe_override_min_severity,
            severe_window_secs: self.config.severe_override_window_secs as f64,
        }
    }
}
