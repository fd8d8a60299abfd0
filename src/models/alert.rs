use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Up,
    Down,
}

impl AlertDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertDirection::Up => "up",
            AlertDirection::Down => "down",
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid alert direction: {0}")]
pub struct ParseAlertDirectionError(String);

impl TryFrom<String> for AlertDirection {
    type Error = ParseAlertDirectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "up" => Ok(AlertDirection::Up),
            "down" => Ok(AlertDirection::Down),
            other => Err(ParseAlertDirectionError(other.to_string())),
        }
    }
}

/// A persisted price alert. The background poller keeps an in-memory
/// snapshot of the active rows and marks crossed alerts as triggered.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PriceAlert {
    pub id: Uuid,
    pub pair: String,
    pub target: f64,
    #[sqlx(try_from = "String")]
    pub direction: AlertDirection,
    pub created_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
}

impl PriceAlert {
    /// Up alerts fire when the price reaches or exceeds the target,
    /// down alerts when it reaches or falls below it.
    pub fn is_crossed_by(&self, current: f64) -> bool {
        match self.direction {
            AlertDirection::Up => current >= self.target,
            AlertDirection::Down => current <= self.target,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePriceAlert {
    pub pair: String,
    pub target: f64,
    pub direction: AlertDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(target: f64, direction: AlertDirection) -> PriceAlert {
        PriceAlert {
            id: Uuid::new_v4(),
            pair: "XAU/USD".to_string(),
            target,
            direction,
            created_at: Utc::now(),
            triggered_at: None,
        }
    }

    #[test]
    fn up_alert_fires_at_or_above_target() {
        let a = alert(2400.0, AlertDirection::Up);
        assert!(!a.is_crossed_by(2399.9));
        assert!(a.is_crossed_by(2400.0));
        assert!(a.is_crossed_by(2410.0));
    }

    #[test]
    fn down_alert_fires_at_or_below_target() {
        let a = alert(2400.0, AlertDirection::Down);
        assert!(!a.is_crossed_by(2400.1));
        assert!(a.is_crossed_by(2400.0));
        assert!(a.is_crossed_by(2380.0));
    }

    #[test]
    fn direction_round_trips_through_text() {
        assert_eq!(
            AlertDirection::try_from("up".to_string()).unwrap(),
            AlertDirection::Up
        );
        assert!(AlertDirection::try_from("sideways".to_string()).is_err());
    }
}
