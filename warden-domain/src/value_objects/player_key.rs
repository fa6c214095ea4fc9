use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one player within one game. Every tier of the state
/// store and every per-key lock is scoped to this pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerKey {
    pub player_id: String,
    pub game_id: String,
}

impl PlayerKey {
    pub fn new(player_id: impl Into<String>, game_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            game_id: game_id.into(),
        }
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.game_id, self.player_id)
    }
}
