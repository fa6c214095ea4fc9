// Warden Application Layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod plugins;
pub mod queries;
pub mod registry;
pub mod state;
pub mod store;

pub use error::AppError;
pub use metrics::Metrics;
pub use plugins::PluginHost;
pub use registry::ProfileRegistry;
pub use state::AppState;
pub use store::PlayerStateStore;

#[cfg(test)]
pub(crate) mod test_support;
