pub mod plugins;
pub mod repositories;
pub mod services;

pub use plugins::{
    AnalyticsPlugin, DetectionPlugin, NotificationPlugin, PluginMetadata, PreProcessingPlugin,
};
pub use repositories::{ActionRepository, ProfileRepository, RiskScoreRecord, WarmCache};
pub use services::{MlScore, MlSignalSource};
