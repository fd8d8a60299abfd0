use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use http::StatusCode;
use tracing::info;
use uuid::Uuid;

use crate::db::alert_queries;
use crate::errors::AppError;
use crate::models::{CreatePriceAlert, PriceAlert};
use crate::services::alert_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/price", get(list_price_alerts).post(create_price_alert))
        .route("/price/:id", delete(delete_price_alert))
}

/// GET /alerts/price
///
/// Serves the poller's snapshot rather than querying the database; the
/// handlers and the poller share no state beyond this one accessor.
async fn list_price_alerts(State(state): State<AppState>) -> Json<Vec<PriceAlert>> {
    let snapshot = state.alerts.current();
    Json(snapshot.as_ref().clone())
}

/// POST /alerts/price
async fn create_price_alert(
    State(state): State<AppState>,
    Json(req): Json<CreatePriceAlert>,
) -> Result<(StatusCode, Json<PriceAlert>), AppError> {
    validate_alert(&req)?;

    let alert = alert_queries::create_alert(&state.pool, &req).await?;
    info!(
        "price alert created: {} {} {}",
        alert.pair,
        alert.direction.as_str(),
        alert.target
    );

    alert_service::refresh_snapshot(&state.pool, &state.alerts).await?;

    Ok((StatusCode::CREATED, Json(alert)))
}

/// DELETE /alerts/price/:id
async fn delete_price_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !alert_queries::delete_alert(&state.pool, id).await? {
        return Err(AppError::NotFound);
    }

    alert_service::refresh_snapshot(&state.pool, &state.alerts).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn validate_alert(req: &CreatePriceAlert) -> Result<(), AppError> {
    if !req.pair.contains('/') {
        return Err(AppError::Validation(
            "pair must be of the form BASE/QUOTE".to_string(),
        ));
    }
    if !req.target.is_finite() || req.target <= 0.0 {
        return Err(AppError::Validation(
            "target must be a positive price".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertDirection;

    fn request(pair: &str, target: f64) -> CreatePriceAlert {
        CreatePriceAlert {
            pair: pair.to_string(),
            target,
            direction: AlertDirection::Up,
        }
    }

    #[test]
    fn accepts_well_formed_alert() {
        assert!(validate_alert(&request("XAU/USD", 2400.0)).is_ok());
    }

    #[test]
    fn rejects_pair_without_separator() {
        assert!(validate_alert(&request("XAUUSD", 2400.0)).is_err());
    }

    #[test]
    fn rejects_non_positive_or_non_finite_target() {
        assert!(validate_alert(&request("XAU/USD", 0.0)).is_err());
        assert!(validate_alert(&request("XAU/USD", -5.0)).is_err());
        assert!(validate_alert(&request("XAU/USD", f64::NAN)).is_err());
    }
}
