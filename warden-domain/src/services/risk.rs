// Risk scoring and ban decision
// The score decays while a player is idle; a burst of severe
// violations can still force a ban recommendation before decay
// softens the score.

use crate::entities::player_state::PlayerState;
use crate::entities::profile::GameProfile;

pub const RISK_SCORE_CAP: f64 = 10.0;
pub const DECAY_FACTOR_PER_HOUR: f64 = 0.9;
/// No decay is applied while the player acted within the last hour.
pub const DECAY_GRACE_SECS: f64 = 3600.0;

#[derive(Debug, Clone)]
pub struct BanPolicy {
    pub severe_override_enabled: bool,
    pub severe_count: usize,
    pub severe_min_severity: f64,
    pub severe_window_secs: f64,
}

impl Default for BanPolicy {
    fn default() -> Self {
        Self {
            severe_override_enabled: true,
            severe_count: 3,
            severe_min_severity: 4.0,
            severe_window_secs: 3600.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub score: f64,
    pub should_ban: bool,
    pub reason: Option<String>,
}

/// Pure decay: reading the score twice without an intervening action
/// must never increase it.
pub fn decayed_score(score: f64, last_action_secs: f64, now: f64) -> f64 {
    if score <= 0.0 {
        return 0.0;
    }
    let capped = score.min(RISK_SCORE_CAP);
    if last_action_secs <= 0.0 {
        return capped;
    }
    let idle = now - last_action_secs;
    if idle <= DECAY_GRACE_SECS {
        return capped;
    }
    let hours = idle / 3600.0;
    (capped * DECAY_FACTOR_PER_HOUR.powf(hours)).clamp(0.0, RISK_SCORE_CAP)
}

pub fn assess(state: &PlayerState, profile: &GameProfile, policy: &BanPolicy, now: f64) -> RiskAssessment {
    let score = decayed_score(state.cumulative_risk_score, state.last_action_secs, now);

    if score >= profile.auto_ban_threshold {
        return RiskAssessment {
            score,
            should_ban: true,
            reason: Some(format!(
                "risk score {score:.2} exceeds threshold {:.2}",
                profile.auto_ban_threshold
            )),
        };
    }

    if policy.severe_override_enabled {
        let cutoff = now - policy.severe_window_secs;
        let severe = state.severe_violations_since(cutoff, policy.severe_min_severity);
        if severe >= policy.severe_count {
            return RiskAssessment {
                score,
                should_ban: true,
                reason: Some(format!(
                    "{severe} violations with severity >= {:.1} within the last {:.0} minutes",
                    policy.severe_min_severity,
                    policy.severe_window_secs / 60.0
                )),
            };
        }
    }

    RiskAssessment {
        score,
        should_ban: false,
        reason: None,
    }
}
