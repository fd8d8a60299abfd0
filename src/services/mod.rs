pub mod alert_service;
pub mod alert_snapshot;
pub mod chart_gate;
pub mod prompt;
