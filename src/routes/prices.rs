use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use crate::external::mock_provider::mock_pair_prices;
use crate::models::PairPrice;
use crate::state::AppState;

const MAJOR_PAIRS: [&str; 5] = ["EUR/USD", "GBP/USD", "USD/JPY", "AUD/USD", "USD/CAD"];

pub fn router() -> Router<AppState> {
    Router::new().route("/prices", get(get_prices))
}

#[derive(Debug, Deserialize)]
struct PricesParams {
    #[serde(default)]
    use_mock: bool,
}

/// GET /prices?use_mock=
///
/// Live quotes for the major pairs. Any provider failure falls back to the
/// mock table so the endpoint never 500s over a flaky upstream.
async fn get_prices(
    State(state): State<AppState>,
    Query(params): Query<PricesParams>,
) -> Json<Vec<PairPrice>> {
    if params.use_mock {
        return Json(major_mock_prices());
    }

    let pairs: Vec<String> = MAJOR_PAIRS.iter().map(|p| p.to_string()).collect();

    match state.price_provider.latest_prices(&pairs).await {
        Ok(prices) if !prices.is_empty() => Json(prices),
        Ok(_) => {
            warn!("price provider returned no quotes, serving mock data");
            Json(major_mock_prices())
        }
        Err(e) => {
            warn!("price provider error: {}, serving mock data", e);
            Json(major_mock_prices())
        }
    }
}

fn major_mock_prices() -> Vec<PairPrice> {
    mock_pair_prices()
        .into_iter()
        .filter(|q| MAJOR_PAIRS.contains(&q.pair.as_str()))
        .collect()
}
