use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use chartsight_backend::external::chart_analyzer::ChartAnalyzer;
use chartsight_backend::external::gemini::GeminiClient;
use chartsight_backend::external::mock_provider::MockPriceProvider;
use chartsight_backend::external::price_provider::PriceProvider;
use chartsight_backend::external::twelvedata::TwelveDataProvider;
use chartsight_backend::services::alert_snapshot::AlertSnapshot;
use chartsight_backend::state::AppState;
use chartsight_backend::{app, jobs, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    logging::init_logging(logging::LoggingConfig::from_env())?;

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    let analyzer: Arc<dyn ChartAnalyzer> = Arc::new(GeminiClient::from_env()?);

    let price_provider: Arc<dyn PriceProvider> = match TwelveDataProvider::from_env() {
        Ok(provider) => {
            tracing::info!("Using Twelve Data price provider");
            Arc::new(provider)
        }
        Err(_) => {
            tracing::warn!("TWELVEDATA_API_KEY not set, using mock price provider");
            Arc::new(MockPriceProvider::new())
        }
    };

    let state = AppState {
        pool,
        analyzer,
        price_provider,
        alerts: AlertSnapshot::new(),
    };

    jobs::alert_sync_job::spawn(state.clone());

    let app = app::create_app(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Chartsight backend running at http://{}/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
