use std::time::Duration;

use tracing::{debug, info, warn};

use crate::services::alert_service;
use crate::state::AppState;

const POLL_INTERVAL_SECS: u64 = 15;

/// Spawn the price-alert poller for the lifetime of the process.
///
/// Each tick reloads the active alerts, checks them against current prices
/// and swaps the in-memory snapshot wholesale. The loop runs independently
/// of the analysis pipeline and a failed tick only skips that tick.
pub fn spawn(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(POLL_INTERVAL_SECS));
        info!("alert poller started (interval: {}s)", POLL_INTERVAL_SECS);

        loop {
            ticker.tick().await;

            match alert_service::evaluate_alerts(
                &state.pool,
                state.price_provider.as_ref(),
                &state.alerts,
            )
            .await
            {
                Ok(sweep) if sweep.triggered > 0 => {
                    info!(
                        "alert sweep: {} checked, {} triggered",
                        sweep.checked, sweep.triggered
                    );
                }
                Ok(sweep) => {
                    debug!("alert sweep: {} checked, none triggered", sweep.checked);
                }
                Err(e) => {
                    warn!("alert sweep failed: {}", e);
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_interval_is_fixed() {
        assert_eq!(POLL_INTERVAL_SECS, 15);
    }
}
