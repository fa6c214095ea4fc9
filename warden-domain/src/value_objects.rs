pub mod genre;
pub mod player_key;
pub mod risk_level;

pub use genre::{ActionCategory, Genre};
pub use player_key::PlayerKey;
pub use risk_level::RiskLevel;
