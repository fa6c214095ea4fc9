pub mod analytics_queries;
pub mod profile_queries;
pub mod risk_queries;
