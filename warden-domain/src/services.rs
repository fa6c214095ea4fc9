pub mod genre_defaults;
pub mod risk;
pub mod rule_engine;

pub use genre_defaults::apply_genre_defaults;
pub use risk::{BanPolicy, RiskAssessment};
pub use rule_engine::{CustomRuleFn, RuleEngine};
