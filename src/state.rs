use std::sync::Arc;

use sqlx::PgPool;

use crate::external::chart_analyzer::ChartAnalyzer;
use crate::external::price_provider::PriceProvider;
use crate::services::alert_snapshot::AlertSnapshot;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub analyzer: Arc<dyn ChartAnalyzer>,
    pub price_provider: Arc<dyn PriceProvider>,
    pub alerts: AlertSnapshot,
}
