pub mod alert_queries;
pub mod analysis_queries;
