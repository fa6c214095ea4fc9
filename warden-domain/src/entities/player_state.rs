// Player state cache entry
// Bounded, event-time-ordered window of recent actions plus the
// cumulative risk score. One live entry per (player_id, game_id)
// across all tiers; tier transitions move the entry, never copy it.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::entities::action::Action;
use crate::entities::violation::Violation;
use crate::services::risk::RISK_SCORE_CAP;

pub const WINDOW_MAX_ACTIONS: usize = 1000;
pub const WINDOW_MAX_AGE_SECS: f64 = 3600.0;

/// Violation history kept for the severe-violations ban override.
pub const SEVERE_HISTORY_WINDOW_SECS: f64 = 3600.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub player_id: String,
    pub game_id: String,
    /// Recent actions, always ordered by event timestamp.
    pub window: Vec<Action>,
    pub cumulative_risk_score: f64,
    /// Wall-clock time of the last store access (tier bookkeeping).
    pub last_access_secs: f64,
    pub last_score_update_secs: f64,
    /// Event time of the newest action, 0.0 when the window is empty.
    pub last_action_secs: f64,
    /// (timestamp, severity) of recent violations, pruned to the
    /// override window.
    #[serde(default)]
    pub severe_history: VecDeque<(f64, f64)>,
}

impl PlayerState {
    pub fn new(player_id: &str, game_id: &str, now: f64) -> Self {
        Self {
            player_id: player_id.to_string(),
            game_id: game_id.to_string(),
            window: Vec::new(),
            cumulative_risk_score: 0.0,
            last_access_secs: now,
            last_score_update_secs: now,
            last_action_secs: 0.0,
            severe_history: VecDeque::new(),
        }
    }

    /// Rebuilds an entry from durable history (already time-ordered).
    pub fn from_history(
        player_id: &str,
        game_id: &str,
        actions: Vec<Action>,
        score: f64,
        now: f64,
    ) -> Self {
        let mut state = Self::new(player_id, game_id, now);
        state.cumulative_risk_score = score.clamp(0.0, RISK_SCORE_CAP);
        for action in actions {
            state.apply_action(action);
        }
        state
    }

    /// Inserts by event timestamp; network jitter may deliver actions
    /// slightly out of submission order.
    pub fn apply_action(&mut self, action: Action) {
        let position = self
            .window
            .iter()
            .rposition(|existing| existing.timestamp <= action.timestamp)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.window.insert(position, action);
        self.last_action_secs = self
            .window
            .last()
            .map(|a| a.timestamp)
            .unwrap_or(self.last_action_secs);
        self.prune_window();
    }

    fn prune_window(&mut self) {
        if self.window.len() > WINDOW_MAX_ACTIONS {
            let excess = self.window.len() - WINDOW_MAX_ACTIONS;
            self.window.drain(..excess);
        }
        let cutoff = self.last_action_secs - WINDOW_MAX_AGE_SECS;
        let keep_from = self
            .window
            .iter()
            .position(|a| a.timestamp >= cutoff)
            .unwrap_or(self.window.len());
        if keep_from > 0 {
            self.window.drain(..keep_from);
        }
    }

    /// Adds the violations' severities to the cumulative score,
    /// clamped to the cap, and records them for the ban override.
    pub fn record_violations(&mut self, violations: &[Violation], now: f64) {
        if violations.is_empty() {
            return;
        }
        let added: f64 = violations.iter().map(|v| v.severity).sum();
        self.cumulative_risk_score =
            (self.cumulative_risk_score + added).clamp(0.0, RISK_SCORE_CAP);
        self.last_score_update_secs = now;
        for violation in violations {
            self.severe_history
                .push_back((violation.timestamp, violation.severity));
        }
        let cutoff = now - SEVERE_HISTORY_WINDOW_SECS;
        while let Some((ts, _)) = self.severe_history.front() {
            if *ts < cutoff {
                self.severe_history.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn severe_violations_since(&self, cutoff: f64, min_severity: f64) -> usize {
        self.severe_history
            .iter()
            .filter(|(ts, severity)| *ts >= cutoff && *severity >= min_severity)
            .count()
    }

    pub fn touch(&mut self, now: f64) {
        self.last_access_secs = now;
    }
}
