// Plugin host
// Four extension points around the analysis pipeline. Plugins are
// sandboxed: a panic-free error or a timeout in one plugin is logged
// and skipped, never surfaced to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::warn;
use warden_domain::ports::{
    AnalyticsPlugin, DetectionPlugin, NotificationPlugin, PluginMetadata, PreProcessingPlugin,
};
use warden_domain::{Action, GameProfile, Genre, PlayerKey, PlayerState, Violation};

use crate::Metrics;

struct Entry<T: ?Sized> {
    metadata: PluginMetadata,
    enabled: AtomicBool,
    plugin: Arc<T>,
}

impl<T: ?Sized> Entry<T> {
    fn new(plugin: Arc<T>, metadata: PluginMetadata) -> Self {
        Self {
            metadata,
            enabled: AtomicBool::new(true),
            plugin,
        }
    }

    fn active_for(&self, genre: Genre) -> bool {
        self.enabled.load(Ordering::Relaxed) && self.metadata.applies_to(genre)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginStatus {
    pub name: String,
    pub version: String,
    pub description: String,
    pub category: &'static str,
    pub enabled: bool,
}

pub struct PluginHost {
    timeout: Duration,
    pre_processing: Vec<Entry<dyn PreProcessingPlugin>>,
    detection: Vec<Entry<dyn DetectionPlugin>>,
    notification: Vec<Entry<dyn NotificationPlugin>>,
    analytics: Vec<Entry<dyn AnalyticsPlugin>>,
    metrics: Arc<Metrics>,
}

impl PluginHost {
    pub fn new(timeout_ms: u64, metrics: Arc<Metrics>) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            pre_processing: Vec::new(),
            detection: Vec::new(),
            notification: Vec::new(),
            analytics: Vec::new(),
            metrics,
        }
    }

    pub fn register_pre_processing(&mut self, plugin: Arc<dyn PreProcessingPlugin>) {
        let metadata = plugin.metadata();
        self.pre_processing.push(Entry::new(plugin, metadata));
    }

    pub fn register_detection(&mut self, plugin: Arc<dyn DetectionPlugin>) {
        let metadata = plugin.metadata();
        self.detection.push(Entry::new(plugin, metadata));
    }

    pub fn register_notification(&mut self, plugin: Arc<dyn NotificationPlugin>) {
        let metadata = plugin.metadata();
        self.notification.push(Entry::new(plugin, metadata));
    }

    pub fn register_analytics(&mut self, plugin: Arc<dyn AnalyticsPlugin>) {
        let metadata = plugin.metadata();
        self.analytics.push(Entry::new(plugin, metadata));
    }

    /// Enables or disables a plugin by name across all categories.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut found = false;
        let mark = |meta: &PluginMetadata, flag: &AtomicBool| {
            if meta.name == name {
                flag.store(enabled, Ordering::Relaxed);
                true
            } else {
                false
            }
        };
        for entry in &self.pre_processing {
            found |= mark(&entry.metadata, &entry.enabled);
        }
        for entry in &self.detection {
            found |= mark(&entry.metadata, &entry.enabled);
        }
        for entry in &self.notification {
            found |= mark(&entry.metadata, &entry.enabled);
        }
        for entry in &self.analytics {
            found |= mark(&entry.metadata, &entry.enabled);
        }
        found
    }

    pub fn list(&self) -> Vec<PluginStatus> {
        let status = |meta: &PluginMetadata, flag: &AtomicBool, category: &'static str| {
            PluginStatus {
                name: meta.name.clone(),
                version: meta.version.clone(),
                description: meta.description.clone(),
                category,
                enabled: flag.load(Ordering::Relaxed),
            }
        };
        let mut all = Vec::new();
        for entry in &self.pre_processing {
            all.push(status(&entry.metadata, &entry.enabled, "pre_processing"));
        }
        for entry in &self.detection {
            all.push(status(&entry.metadata, &entry.enabled, "detection"));
        }
        for entry in &self.notification {
            all.push(status(&entry.metadata, &entry.enabled, "notification"));
        }
        for entry in &self.analytics {
            all.push(status(&entry.metadata, &entry.enabled, "analytics"));
        }
        all
    }

    /// Pipes the action through pre-processing plugins in registration
    /// order. `None` means a plugin dropped the action.
    pub async fn pre_process(&self, mut action: Action, profile: &GameProfile) -> Option<Action> {
        for entry in &self.pre_processing {
            if !entry.active_for(profile.genre) {
                continue;
            }
            match timeout(self.timeout, entry.plugin.process(action.clone(), profile)).await {
                Ok(Ok(Some(processed))) => action = processed,
                Ok(Ok(None)) => return None,
                Ok(Err(err)) => {
                    warn!("pre-processing plugin {} failed: {err}", entry.metadata.name);
                }
                Err(_) => {
                    self.metrics.record_plugin_timeout();
                    warn!("pre-processing plugin {} timed out", entry.metadata.name);
                }
            }
        }
        Some(action)
    }

    /// Runs the evaluated violation set back through the
    /// pre-processing chain in registration order. A failing or slow
    /// plugin leaves the set as it stood before that plugin.
    pub async fn post_process(
        &self,
        mut violations: Vec<Violation>,
        profile: &GameProfile,
    ) -> Vec<Violation> {
        for entry in &self.pre_processing {
            if !entry.active_for(profile.genre) {
                continue;
            }
            match timeout(
                self.timeout,
                entry.plugin.post_process(violations.clone(), profile),
            )
            .await
            {
                Ok(Ok(rewritten)) => violations = rewritten,
                Ok(Err(err)) => {
                    warn!("post-processing in plugin {} failed: {err}", entry.metadata.name);
                }
                Err(_) => {
                    self.metrics.record_plugin_timeout();
                    warn!("post-processing in plugin {} timed out", entry.metadata.name);
                }
            }
        }
        violations
    }

    pub async fn detect(
        &self,
        action: &Action,
        state: &PlayerState,
        profile: &GameProfile,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        for entry in &self.detection {
            if !entry.active_for(profile.genre) {
                continue;
            }
            match timeout(self.timeout, entry.plugin.detect(action, state, profile)).await {
                Ok(Ok(mut found)) => violations.append(&mut found),
                Ok(Err(err)) => {
                    warn!("detection plugin {} failed: {err}", entry.metadata.name);
                }
                Err(_) => {
                    self.metrics.record_plugin_timeout();
                    warn!("detection plugin {} timed out", entry.metadata.name);
                }
            }
        }
        violations
    }

    /// Notifications are fire-and-forget; delivery failures must never
    /// stall analysis.
    pub fn spawn_notifications(self: &Arc<Self>, genre: Genre, violations: Vec<Violation>) {
        if violations.is_empty() {
            return;
        }
        let plugins: Vec<(String, Arc<dyn NotificationPlugin>)> = self
            .notification
            .iter()
            .filter(|entry| entry.active_for(genre))
            .map(|entry| (entry.metadata.name.clone(), entry.plugin.clone()))
            .collect();
        if plugins.is_empty() {
            return;
        }
        let host = Arc::clone(self);
        tokio::spawn(async move {
            for violation in &violations {
                for (name, plugin) in &plugins {
                    match timeout(host.timeout, plugin.notify(violation)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(err)) => warn!("notification plugin {name} failed: {err}"),
                        Err(_) => {
                            host.metrics.record_plugin_timeout();
                            warn!("notification plugin {name} timed out");
                        }
                    }
                }
            }
        });
    }

    /// Fans the window out to analytics plugins; the result maps
    /// plugin name to its report.
    pub async fn analytics(
        &self,
        genre: Genre,
        key: &PlayerKey,
        window: &[Action],
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut reports = serde_json::Map::new();
        for entry in &self.analytics {
            if !entry.active_for(genre) {
                continue;
            }
            match timeout(self.timeout, entry.plugin.analyze(key, window)).await {
                Ok(Ok(report)) => {
                    reports.insert(entry.metadata.name.clone(), report);
                }
                Ok(Err(err)) => {
                    warn!("analytics plugin {} failed: {err}", entry.metadata.name);
                }
                Err(_) => {
                    self.metrics.record_plugin_timeout();
                    warn!("analytics plugin {} timed out", entry.metadata.name);
                }
            }
        }
        reports
    }
}
