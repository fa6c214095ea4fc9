// ClickHouse-backed durable tier
// Append-only action history and violation audit trail with TTLs, plus
// a ReplacingMergeTree checkpoint table for risk scores.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;
use warden_domain::ports::{ActionRepository, RiskScoreRecord};
use warden_domain::{secs_to_utc, utc_to_secs, Action, ActionValue, PlayerKey, Violation};

#[derive(Clone)]
pub struct ClickhouseRepo {
    client: Client,
    database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct ActionRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    event_time: OffsetDateTime,
    player_id: String,
    game_id: String,
    action_type: String,
    value_json: String,
    metadata_json: String,
    session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct ViolationRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    event_time: OffsetDateTime,
    player_id: String,
    game_id: String,
    violation_type: String,
    rule_id: String,
    severity: f64,
    details_json: String,
    action_context_json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Row)]
struct ScoreRow {
    #[serde(with = "clickhouse::serde::time::datetime64::millis")]
    updated_at: OffsetDateTime,
    player_id: String,
    game_id: String,
    score: f64,
}

impl ClickhouseRepo {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }
}

fn action_to_row(action: &Action) -> ActionRow {
    ActionRow {
        event_time: secs_to_utc(action.timestamp),
        player_id: action.player_id.clone(),
        game_id: action.game_id.clone(),
        action_type: action.action_type.clone(),
        value_json: serde_json::to_string(&action.value).unwrap_or_else(|_| "null".to_string()),
        metadata_json: serde_json::to_string(&action.metadata)
            .unwrap_or_else(|_| "{}".to_string()),
        session_id: action.session_id.clone().unwrap_or_default(),
    }
}

fn row_to_action(row: ActionRow) -> Action {
    let value: ActionValue = serde_json::from_str(&row.value_json).unwrap_or_default();
    let metadata: HashMap<String, String> =
        serde_json::from_str(&row.metadata_json).unwrap_or_default();
    Action {
        player_id: row.player_id,
        game_id: row.game_id,
        action_type: row.action_type,
        timestamp: utc_to_secs(row.event_time),
        value,
        metadata,
        session_id: if row.session_id.is_empty() {
            None
        } else {
            Some(row.session_id)
        },
    }
}

fn violation_to_row(violation: &Violation) -> ViolationRow {
    ViolationRow {
        event_time: secs_to_utc(violation.timestamp),
        player_id: violation.player_id.clone(),
        game_id: violation.game_id.clone(),
        violation_type: violation.violation_type.as_str().to_string(),
        rule_id: violation.rule_id.clone(),
        severity: violation.severity,
        details_json: serde_json::to_string(&violation.details)
            .unwrap_or_else(|_| "{}".to_string()),
        action_context_json: serde_json::to_string(&violation.action_context)
            .unwrap_or_else(|_| "[]".to_string()),
    }
}

#[async_trait]
impl ActionRepository for ClickhouseRepo {
    async fn ensure_schema(&self) -> Result<()> {
        let create_db = format!("CREATE DATABASE IF NOT EXISTS {}", self.database);
        self.client.query(&create_db).execute().await?;

        let create_actions = r#"
CREATE TABLE IF NOT EXISTS player_actions (
    event_time DateTime64(3),
    player_id String,
    game_id String,
    action_type String,
    value_json String,
    metadata_json String,
    session_id String
) ENGINE = MergeTree
PARTITION BY toDate(event_time)
ORDER BY (game_id, player_id, event_time)
TTL toDateTime(event_time) + INTERVAL 30 DAY
"#;
        self.client.query(create_actions).execute().await?;

        let create_violations = r#"
CREATE TABLE IF NOT EXISTS violations (
    event_time DateTime64(3),
    player_id String,
    game_id String,
    violation_type String,
    rule_id String,
    severity Float64,
    details_json String,
    action_context_json String
) ENGINE = MergeTree
PARTITION BY toDate(event_time)
ORDER BY (game_id, player_id, event_time)
TTL toDateTime(event_time) + INTERVAL 90 DAY
"#;
        self.client.query(create_violations).execute().await?;

        let create_scores = r#"
CREATE TABLE IF NOT EXISTS risk_scores (
    updated_at DateTime64(3),
    player_id String,
    game_id String,
    score Float64
) ENGINE = ReplacingMergeTree(updated_at)
ORDER BY (game_id, player_id)
"#;
        self.client.query(create_scores).execute().await?;
        Ok(())
    }

    async fn append_action(&self, action: &Action) -> Result<()> {
        let mut insert = self.client.insert("player_actions")?;
        insert.write(&action_to_row(action)).await?;
        insert.end().await?;
        Ok(())
    }

    async fn load_recent_actions(
        &self,
        key: &PlayerKey,
        lookback_secs: f64,
        limit: usize,
    ) -> Result<Vec<Action>> {
        let cutoff_millis = ((utc_to_secs(OffsetDateTime::now_utc()) - lookback_secs) * 1_000.0)
            .max(0.0) as i64;
        let rows = self
            .client
            .query(
                "SELECT event_time, player_id, game_id, action_type, value_json, metadata_json, \
                 session_id \
                 FROM player_actions \
                 WHERE game_id = ? AND player_id = ? \
                 AND event_time >= fromUnixTimestamp64Milli(?) \
                 ORDER BY event_time DESC \
                 LIMIT ?",
            )
            .bind(&key.game_id)
            .bind(&key.player_id)
            .bind(cutoff_millis)
            .bind(limit as u64)
            .fetch_all::<ActionRow>()
            .await?;

        let mut actions: Vec<Action> = rows.into_iter().map(row_to_action).collect();
        actions.reverse();
        Ok(actions)
    }

    async fn insert_violations(&self, violations: &[Violation]) -> Result<()> {
        if violations.is_empty() {
            return Ok(());
        }
        let mut insert = self.client.insert("violations")?;
        for violation in violations {
            insert.write(&violation_to_row(violation)).await?;
        }
        insert.end().await?;
        Ok(())
    }

    async fn load_score(&self, key: &PlayerKey) -> Result<Option<RiskScoreRecord>> {
        let row = self
            .client
            .query(
                "SELECT updated_at, player_id, game_id, score \
                 FROM risk_scores \
                 WHERE game_id = ? AND player_id = ? \
                 ORDER BY updated_at DESC \
                 LIMIT 1",
            )
            .bind(&key.game_id)
            .bind(&key.player_id)
            .fetch_optional::<ScoreRow>()
            .await?;
        Ok(row.map(|row| RiskScoreRecord {
            score: row.score,
            updated_secs: utc_to_secs(row.updated_at),
        }))
    }

    async fn upsert_score(&self, key: &PlayerKey, score: f64, updated_secs: f64) -> Result<()> {
        let mut insert = self.client.insert("risk_scores")?;
        insert
            .write(&ScoreRow {
                updated_at: secs_to_utc(updated_secs),
                player_id: key.player_id.clone(),
                game_id: key.game_id.clone(),
                score,
            })
            .await?;
        if let Err(err) = insert.end().await {
            warn!("risk score checkpoint for {} failed: {err}", key);
            return Err(err.into());
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.client.query("SELECT 1").execute().await?;
        Ok(())
    }
}
