//! Background jobs running independently of request handling.
//!
//! The only job is the price-alert poller: it owns the alert snapshot and
//! replaces it wholesale on every tick, so handlers never see a partially
//! updated alert list.

pub mod alert_sync_job;
