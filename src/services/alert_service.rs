use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::db::alert_queries;
use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::PriceAlert;
use crate::services::alert_snapshot::AlertSnapshot;

/// Outcome of one polling sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertSweep {
    pub checked: usize,
    pub triggered: usize,
}

/// Reload the snapshot from the database without evaluating prices.
/// Called by the alert CRUD handlers so reads reflect writes immediately
/// instead of waiting for the next poller tick.
pub async fn refresh_snapshot(pool: &PgPool, snapshot: &AlertSnapshot) -> Result<(), AppError> {
    let alerts = alert_queries::active_alerts(pool).await?;
    snapshot.replace(alerts);
    Ok(())
}

/// One sweep of the alert poller: load active alerts, fetch current prices
/// for the referenced pairs, mark crossed alerts as triggered and swap the
/// in-memory snapshot wholesale.
pub async fn evaluate_alerts(
    pool: &PgPool,
    provider: &dyn PriceProvider,
    snapshot: &AlertSnapshot,
) -> Result<AlertSweep, AppError> {
    let alerts = alert_queries::active_alerts(pool).await?;
    let checked = alerts.len();

    let prices = if alerts.is_empty() {
        HashMap::new()
    } else {
        let mut pairs: Vec<String> = alerts.iter().map(|a| a.pair.clone()).collect();
        pairs.sort();
        pairs.dedup();

        match provider.latest_prices(&pairs).await {
            Ok(quotes) => quotes.into_iter().map(|q| (q.pair, q.price)).collect(),
            Err(e) => {
                // A failed fetch skips this tick; alerts stay active.
                warn!("alert sweep: price fetch failed: {}", e);
                HashMap::new()
            }
        }
    };

    let (crossed, mut remaining) = partition_crossed(alerts, &prices);

    let updates = futures::future::join_all(
        crossed
            .iter()
            .map(|alert| alert_queries::mark_triggered(pool, alert.id)),
    )
    .await;

    let (confirmed, requeued) = settle_marks(crossed, updates);
    let triggered = confirmed.len();

    for alert in &confirmed {
        info!(
            "price alert triggered: {} {} {} (current {})",
            alert.pair,
            alert.direction.as_str(),
            alert.target,
            prices.get(&alert.pair).copied().unwrap_or(f64::NAN),
        );
    }

    remaining.extend(requeued);
    snapshot.replace(remaining);

    Ok(AlertSweep { checked, triggered })
}

/// Reconcile crossed alerts with their database updates. An update that
/// touched no row means the alert was deleted (or triggered elsewhere)
/// between the sweep's load and its write; it neither fires nor stays in
/// the snapshot. Failed updates keep the alert active for the next tick.
fn settle_marks(
    crossed: Vec<PriceAlert>,
    updates: Vec<Result<bool, sqlx::Error>>,
) -> (Vec<PriceAlert>, Vec<PriceAlert>) {
    let mut confirmed = Vec::new();
    let mut requeued = Vec::new();
    for (alert, update) in crossed.into_iter().zip(updates) {
        match update {
            Ok(true) => confirmed.push(alert),
            Ok(false) => {
                warn!("alert {} vanished before it could be marked triggered", alert.id);
            }
            Err(e) => {
                warn!("failed to mark alert {} triggered: {}", alert.id, e);
                requeued.push(alert);
            }
        }
    }
    (confirmed, requeued)
}

/// Split alerts into those crossed by the current prices and the rest.
/// Alerts whose pair has no quote this tick are kept active.
fn partition_crossed(
    alerts: Vec<PriceAlert>,
    prices: &HashMap<String, f64>,
) -> (Vec<PriceAlert>, Vec<PriceAlert>) {
    let mut crossed = Vec::new();
    let mut remaining = Vec::new();
    for alert in alerts {
        match prices.get(&alert.pair) {
            Some(&current) if alert.is_crossed_by(current) => crossed.push(alert),
            _ => remaining.push(alert),
        }
    }
    (crossed, remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertDirection;
    use chrono::Utc;
    use uuid::Uuid;

    fn alert(pair: &str, target: f64, direction: AlertDirection) -> PriceAlert {
        PriceAlert {
            id: Uuid::new_v4(),
            pair: pair.to_string(),
            target,
            direction,
            created_at: Utc::now(),
            triggered_at: None,
        }
    }

    #[test]
    fn partition_splits_on_target_crossing() {
        let alerts = vec![
            alert("XAU/USD", 2400.0, AlertDirection::Up),
            alert("XAU/USD", 2500.0, AlertDirection::Up),
            alert("EUR/USD", 1.10, AlertDirection::Down),
        ];
        let prices = HashMap::from([
            ("XAU/USD".to_string(), 2450.0),
            ("EUR/USD".to_string(), 1.12),
        ]);

        let (crossed, remaining) = partition_crossed(alerts, &prices);
        assert_eq!(crossed.len(), 1);
        assert_eq!(crossed[0].target, 2400.0);
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn update_that_touched_no_row_is_not_counted_as_triggered() {
        let crossed = vec![
            alert("XAU/USD", 2400.0, AlertDirection::Up),
            alert("EUR/USD", 1.10, AlertDirection::Down),
            alert("BTC/USD", 50_000.0, AlertDirection::Up),
        ];
        let updates = vec![Ok(true), Ok(false), Err(sqlx::Error::RowNotFound)];

        let (confirmed, requeued) = settle_marks(crossed, updates);
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].pair, "XAU/USD");
        // The deleted alert is dropped, the failed update stays active.
        assert_eq!(requeued.len(), 1);
        assert_eq!(requeued[0].pair, "BTC/USD");
    }

    #[test]
    fn alerts_without_a_quote_stay_active() {
        let alerts = vec![alert("BTC/USD", 50_000.0, AlertDirection::Up)];
        let (crossed, remaining) = partition_crossed(alerts, &HashMap::new());
        assert!(crossed.is_empty());
        assert_eq!(remaining.len(), 1);
    }
}
