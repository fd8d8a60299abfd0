use serde::{Deserialize, Serialize};

/// A live quote for a currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPrice {
    pub pair: String,
    pub price: f64,
    pub change: f64,
}
