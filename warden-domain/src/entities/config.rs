// Runtime configuration handed to the engine after the
// infrastructure layer has loaded, normalized and validated it.

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Memory-tier entry limit before LRU demotion kicks in.
    pub memory_max_players: usize,
    /// Inactivity before a memory-tier entry is swept to the warm tier.
    pub memory_ttl_secs: u64,
    /// TTL applied to warm-tier snapshots.
    pub warm_ttl_secs: u64,
    /// Durable-store lookback when reconstructing a cold player.
    pub lookback_secs: u64,
    pub lookback_limit: usize,
    /// Violations at or above this severity trigger notification plugins.
    pub notify_min_severity: f64,
    /// ML probability above this maps to an ml_detection violation.
    pub ml_probability_threshold: f64,
    pub plugin_timeout_ms: u64,
    pub ml_timeout_ms: u64,
    pub severe_override_enabled: bool,
    pub severe_override_count: usize,
    pub severe_override_min_severity: f64,
    pub severe_override_window_secs: u64,
    pub sweep_interval_secs: u64,
    pub profiles_dir: String,
    pub persist_retry_max_attempts: u32,
    pub persist_retry_base_ms: u64,
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
}
