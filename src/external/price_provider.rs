use async_trait::async_trait;
use thiserror::Error;

use crate::models::PairPrice;

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Source of live quotes for currency pairs, consumed by the prices
/// endpoint and the alert poller.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch the current price for each requested pair. Pairs the provider
    /// cannot quote are simply absent from the result.
    async fn latest_prices(&self, pairs: &[String]) -> Result<Vec<PairPrice>, PriceProviderError>;
}
