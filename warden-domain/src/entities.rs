pub mod action;
pub mod config;
pub mod player_state;
pub mod profile;
pub mod rule;
pub mod violation;

pub use action::{Action, ActionValue, AnalysisResult};
pub use config::{DbConfig, RuntimeConfig};
pub use player_state::{PlayerState, WINDOW_MAX_ACTIONS, WINDOW_MAX_AGE_SECS};
pub use profile::{ActionDefinition, GameProfile, ValidationError, ValueRange, ValueType};
pub use rule::{DetectionRule, RuleParams};
pub use violation::{Violation, ViolationType};
