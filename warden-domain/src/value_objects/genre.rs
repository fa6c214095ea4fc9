// Game genre and action category value objects

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Mmorpg,
    MobileRpg,
    Fps,
    Moba,
    BattleRoyale,
    Strategy,
    Puzzle,
    Idle,
    Card,
    Racing,
    Sports,
    Casino,
    Platform,
    Sandbox,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Mmorpg => "mmorpg",
            Genre::MobileRpg => "mobile_rpg",
            Genre::Fps => "fps",
            Genre::Moba => "moba",
            Genre::BattleRoyale => "battle_royale",
            Genre::Strategy => "strategy",
            Genre::Puzzle => "puzzle",
            Genre::Idle => "idle",
            Genre::Card => "card",
            Genre::Racing => "racing",
            Genre::Sports => "sports",
            Genre::Casino => "casino",
            Genre::Platform => "platform",
            Genre::Sandbox => "sandbox",
        }
    }

    /// Unknown genre strings fall back to the sandbox starter set.
    pub fn parse_or_sandbox(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "mmorpg" => Genre::Mmorpg,
            "mobile_rpg" => Genre::MobileRpg,
            "fps" => Genre::Fps,
            "moba" => Genre::Moba,
            "battle_royale" => Genre::BattleRoyale,
            "strategy" => Genre::Strategy,
            "puzzle" => Genre::Puzzle,
            "idle" => Genre::Idle,
            "card" => Genre::Card,
            "racing" => Genre::Racing,
            "sports" => Genre::Sports,
            "casino" => Genre::Casino,
            "platform" => Genre::Platform,
            _ => Genre::Sandbox,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Economy,
    Progression,
    Resource,
    Combat,
    Movement,
    Social,
    Customization,
    Achievement,
    Competitive,
    Gacha,
    MiniGame,
    Admin,
}
