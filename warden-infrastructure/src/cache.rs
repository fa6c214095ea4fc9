pub mod local_warm_cache;

pub use local_warm_cache::LocalWarmCache;
