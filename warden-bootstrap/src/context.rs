use std::sync::Arc;

use anyhow::Result;
use clickhouse::Client;
use tracing::info;

use warden_application::{AppState, Metrics, PlayerStateStore, PluginHost, ProfileRegistry};
use warden_domain::ports::{ActionRepository, ProfileRepository};
use warden_domain::services::rule_engine::RuleEngine;
use warden_infrastructure::{
    AppConfig, BehaviorAnalyticsPlugin, ClickhouseRepo, FpsAimAssistPlugin, LocalWarmCache,
    ProfileFileRepository, WebhookNotifier,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();

        let mut clickhouse = Client::default()
            .with_url(&db_config.clickhouse_url)
            .with_database(&db_config.clickhouse_database);
        if let Some(user) = &db_config.clickhouse_user {
            clickhouse = clickhouse.with_user(user);
        }
        if let Some(password) = &db_config.clickhouse_password {
            clickhouse = clickhouse.with_password(password);
        }

        let action_repo = Arc::new(ClickhouseRepo::new(
            clickhouse,
            db_config.clickhouse_database.clone(),
        ));
        action_repo.ensure_schema().await?;
        action_repo.ping().await?;
        info!("durable store reachable at {}", db_config.clickhouse_url);

        let profile_repo = Arc::new(ProfileFileRepository::new(&runtime_config.profiles_dir));
        let profiles = profile_repo.load_all().await?;
        info!("loaded {} game profiles", profiles.len());

        let metrics = Arc::new(Metrics::default());
        let store = Arc::new(PlayerStateStore::new(
            runtime_config.clone(),
            Arc::new(LocalWarmCache::new()),
            action_repo.clone(),
            metrics.clone(),
        ));

        let mut plugins = PluginHost::new(runtime_config.plugin_timeout_ms, metrics.clone());
        plugins.register_detection(Arc::new(FpsAimAssistPlugin));
        plugins.register_analytics(Arc::new(BehaviorAnalyticsPlugin));
        if let Some(url) = &runtime_config.webhook_url {
            plugins.register_notification(Arc::new(WebhookNotifier::new(
                url.clone(),
                runtime_config.webhook_timeout_secs,
            )?));
        }
        for status in plugins.list() {
            info!(
                "plugin {} v{} ({}) registered",
                status.name, status.version, status.category
            );
        }

        let state = AppState {
            config: runtime_config,
            profiles: Arc::new(ProfileRegistry::from_profiles(profiles)),
            store,
            action_repo: action_repo.clone(),
            profile_repo,
            rule_engine: Arc::new(RuleEngine::new()),
            plugins: Arc::new(plugins),
            ml_signal: None,
            metrics,
        };

        Ok(Self { state })
    }
}
