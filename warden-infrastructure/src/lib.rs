// Warden Infrastructure Layer

pub mod cache;
pub mod config;
pub mod plugins;
pub mod repositories;

pub use cache::*;
pub use config::*;
pub use plugins::*;
pub use repositories::*;
