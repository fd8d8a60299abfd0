use async_trait::async_trait;
use rand::Rng;

use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::PairPrice;

const BASE_QUOTES: [(&str, f64, f64); 8] = [
    ("EUR/USD", 1.0852, 0.12),
    ("GBP/USD", 1.2678, -0.23),
    ("USD/JPY", 151.45, 0.45),
    ("AUD/USD", 0.6532, -0.12),
    ("USD/CAD", 1.3542, 0.08),
    ("XAU/USD", 2412.30, 0.31),
    ("BTC/USD", 64_250.0, 1.20),
    ("ETH/USD", 3_118.0, 0.85),
];

/// Fixed quote table used for local development and as the documented
/// fallback when no Twelve Data key is configured.
pub fn mock_pair_prices() -> Vec<PairPrice> {
    BASE_QUOTES
        .iter()
        .map(|&(pair, price, change)| PairPrice {
            pair: pair.to_string(),
            price,
            change,
        })
        .collect()
}

/// Provider serving the mock table with a little jitter so the alert
/// poller and the UI see movement during development.
pub struct MockPriceProvider;

impl MockPriceProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockPriceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    async fn latest_prices(&self, pairs: &[String]) -> Result<Vec<PairPrice>, PriceProviderError> {
        let mut rng = rand::rng();
        Ok(mock_pair_prices()
            .into_iter()
            .filter(|quote| pairs.iter().any(|p| p == &quote.pair))
            .map(|mut quote| {
                quote.price *= 1.0 + rng.random_range(-0.001..0.001);
                quote
            })
            .collect())
    }
}
