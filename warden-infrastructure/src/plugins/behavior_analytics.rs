// Window-level behavior summary for dashboards and investigations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;
use warden_domain::ports::{AnalyticsPlugin, PluginMetadata};
use warden_domain::{Action, PlayerKey};

pub struct BehaviorAnalyticsPlugin;

#[async_trait]
impl AnalyticsPlugin for BehaviorAnalyticsPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(
            "behavior_analytics",
            "1.0.0",
            "action distribution and timing summary",
        )
    }

    async fn analyze(
        &self,
        _key: &PlayerKey,
        window: &[Action],
    ) -> anyhow::Result<serde_json::Value> {
        if window.is_empty() {
            return Ok(json!({ "total_actions": 0 }));
        }

        let mut distribution: BTreeMap<&str, u64> = BTreeMap::new();
        for action in window {
            *distribution.entry(action.action_type.as_str()).or_insert(0) += 1;
        }

        let first = window.first().map(|a| a.timestamp).unwrap_or(0.0);
        let last = window.last().map(|a| a.timestamp).unwrap_or(0.0);
        let intervals: Vec<f64> = window
            .windows(2)
            .map(|pair| pair[1].timestamp - pair[0].timestamp)
            .collect();
        let mean_interval = if intervals.is_empty() {
            0.0
        } else {
            intervals.iter().sum::<f64>() / intervals.len() as f64
        };
        let interval_variance = if intervals.is_empty() {
            0.0
        } else {
            intervals
                .iter()
                .map(|v| (v - mean_interval).powi(2))
                .sum::<f64>()
                / intervals.len() as f64
        };

        Ok(json!({
            "total_actions": window.len(),
            "action_distribution": distribution,
            "window_span_secs": last - first,
            "mean_interval_secs": mean_interval,
            "interval_variance": interval_variance,
        }))
    }
}
