use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::PriceAlert;

/// Atomically swapped snapshot of the active price alerts.
///
/// The background poller replaces the whole collection on every tick;
/// request handlers read through `current` and never observe a partially
/// updated list. Readers keep whatever `Arc` they cloned, so a swap never
/// invalidates an in-flight response.
#[derive(Clone, Default)]
pub struct AlertSnapshot {
    inner: Arc<RwLock<Arc<Vec<PriceAlert>>>>,
}

impl AlertSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Arc<Vec<PriceAlert>> {
        self.inner.read().clone()
    }

    pub fn replace(&self, alerts: Vec<PriceAlert>) {
        *self.inner.write() = Arc::new(alerts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertDirection;
    use chrono::Utc;
    use uuid::Uuid;

    fn alert(pair: &str) -> PriceAlert {
        PriceAlert {
            id: Uuid::new_v4(),
            pair: pair.to_string(),
            target: 1.0,
            direction: AlertDirection::Up,
            created_at: Utc::now(),
            triggered_at: None,
        }
    }

    #[test]
    fn starts_empty() {
        let snapshot = AlertSnapshot::new();
        assert!(snapshot.current().is_empty());
    }

    #[test]
    fn replace_swaps_the_collection_wholesale() {
        let snapshot = AlertSnapshot::new();
        snapshot.replace(vec![alert("EUR/USD"), alert("XAU/USD")]);
        assert_eq!(snapshot.current().len(), 2);

        snapshot.replace(vec![alert("BTC/USD")]);
        let current = snapshot.current();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].pair, "BTC/USD");
    }

    #[test]
    fn readers_keep_their_arc_across_swaps() {
        let snapshot = AlertSnapshot::new();
        snapshot.replace(vec![alert("EUR/USD")]);

        let before = snapshot.current();
        snapshot.replace(Vec::new());

        assert_eq!(before.len(), 1);
        assert!(snapshot.current().is_empty());
    }
}
