use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    actions_analyzed: AtomicU64,
    invalid_actions: AtomicU64,
    violations: AtomicU64,
    ban_recommendations: AtomicU64,
    persistence_retries: AtomicU64,
    plugin_timeouts: AtomicU64,
    ml_signals: AtomicU64,
}

impl Metrics {
    pub fn record_action(&self) {
        self.actions_analyzed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_action(&self) {
        self.invalid_actions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_violations(&self, count: usize) {
        self.violations.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_ban_recommendation(&self) {
        self.ban_recommendations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persistence_retry(&self) {
        self.persistence_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_plugin_timeout(&self) {
        self.plugin_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ml_signal(&self) {
        self.ml_signals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn violations_total(&self) -> u64 {
        self.violations.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let analyzed = self.actions_analyzed.load(Ordering::Relaxed);
        let invalid = self.invalid_actions.load(Ordering::Relaxed);
        let violations = self.violations.load(Ordering::Relaxed);
        let bans = self.ban_recommendations.load(Ordering::Relaxed);
        let retries = self.persistence_retries.load(Ordering::Relaxed);
        let timeouts = self.plugin_timeouts.load(Ordering::Relaxed);
        let ml = self.ml_signals.load(Ordering::Relaxed);

        format!(
            "# TYPE warden_actions_analyzed_total counter\n\
warden_actions_analyzed_total {}\n\
# TYPE warden_invalid_actions_total counter\n\
warden_invalid_actions_total {}\n\
# TYPE warden_violations_total counter\n\
warden_violations_total {}\n\
# TYPE warden_ban_recommendations_total counter\n\
warden_ban_recommendations_total {}\n\
# TYPE warden_persistence_retries_total counter\n\
warden_persistence_retries_total {}\n\
# TYPE warden_plugin_timeouts_total counter\n\
warden_plugin_timeouts_total {}\n\
# TYPE warden_ml_signals_total counter\n\
warden_ml_signals_total {}\n",
            analyzed, invalid, violations, bans, retries, timeouts, ml
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prometheus_render_contains_all_counters() {
        let metrics = Metrics::default();
        metrics.record_action();
        metrics.record_violations(3);
        let rendered = metrics.render_prometheus();
        assert!(rendered.contains("warden_actions_analyzed_total 1"));
        assert!(rendered.contains("warden_violations_total 3"));
        assert!(rendered.contains("warden_plugin_timeouts_total 0"));
    }
}
