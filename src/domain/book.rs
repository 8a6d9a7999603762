//! Order book snapshots with liquidity and staleness guards.
//!
//! A snapshot is derived once from raw levels and then queried by the
//! pricer. Anything older than the configured staleness window must be
//! refreshed before an order is finally priced.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Spread percent above which a book is flagged as wide. Advisory only.
pub const WIDE_SPREAD_THRESHOLD_PCT: f64 = 10.0;

/// Top-of-book snapshot for one tradable token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// Token this book belongs to.
    pub token_id: String,
    /// Highest resting buy price, if any.
    pub best_bid: Option<f64>,
    /// Lowest resting sell price, if any.
    pub best_ask: Option<f64>,
    /// `best_ask - best_bid` when both sides are nonzero, else 0.
    pub spread: f64,
    /// Spread relative to the mid price, in percent.
    pub spread_percent: f64,
    /// Total size resting on the bid side.
    pub bid_depth: f64,
    /// Total size resting on the ask side.
    pub ask_depth: f64,
    /// Either side of the book is empty.
    pub is_low_liquidity: bool,
    /// Spread percent exceeds the fixed threshold.
    pub is_wide_spread: bool,
    /// When the book was fetched.
    pub captured_at: DateTime<Utc>,
}

impl OrderBookSnapshot {
    /// Build a snapshot from parsed levels.
    ///
    /// Bids must be sorted descending by price, asks ascending; the
    /// adapter guarantees ordering before handing levels over.
    pub fn from_levels(
        token_id: impl Into<String>,
        bids: &[(f64, f64)],
        asks: &[(f64, f64)],
    ) -> Self {
        let best_bid = bids.first().map(|l| l.0).filter(|p| *p > 0.0);
        let best_ask = asks.first().map(|l| l.0).filter(|p| *p > 0.0);

        let (spread, spread_percent) = match (best_bid, best_ask) {
            (Some(bid), Some(ask)) => {
                let spread = ask - bid;
                let mid = (ask + bid) / 2.0;
                let pct = if mid > 0.0 { spread / mid * 100.0 } else { 0.0 };
                (spread, pct)
            }
            _ => (0.0, 0.0),
        };

        let bid_depth: f64 = bids.iter().map(|l| l.1).sum();
        let ask_depth: f64 = asks.iter().map(|l| l.1).sum();

        Self {
            token_id: token_id.into(),
            best_bid,
            best_ask,
            spread,
            spread_percent,
            bid_depth,
            ask_depth,
            is_low_liquidity: best_bid.is_none() || best_ask.is_none(),
            is_wide_spread: spread_percent > WIDE_SPREAD_THRESHOLD_PCT,
            captured_at: Utc::now(),
        }
    }

    /// Age of this snapshot in whole seconds.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.captured_at).num_seconds()
    }

    /// Whether the snapshot is older than the given window.
    pub fn is_stale(&self, window: std::time::Duration) -> bool {
        let age = Utc::now() - self.captured_at;
        age > Duration::from_std(window).unwrap_or_else(|_| Duration::seconds(i64::MAX / 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_invariant_with_both_sides() {
        let book = OrderBookSnapshot::from_levels(
            "tok",
            &[(0.40, 100.0), (0.39, 50.0)],
            &[(0.44, 80.0), (0.45, 20.0)],
        );
        assert_eq!(book.best_bid, Some(0.40));
        assert_eq!(book.best_ask, Some(0.44));
        assert!((book.spread - 0.04).abs() < 1e-12);
        assert!(!book.is_low_liquidity);
        assert_eq!(book.bid_depth, 150.0);
        assert_eq!(book.ask_depth, 100.0);
    }

    #[test]
    fn empty_side_means_zero_spread_and_low_liquidity() {
        let book = OrderBookSnapshot::from_levels("tok", &[(0.40, 100.0)], &[]);
        assert_eq!(book.spread, 0.0);
        assert_eq!(book.spread_percent, 0.0);
        assert!(book.is_low_liquidity);
        assert!(!book.is_wide_spread);
    }

    #[test]
    fn wide_spread_flagged_above_threshold() {
        // mid = 0.50, spread = 0.20 → 40% > 10%
        let book =
            OrderBookSnapshot::from_levels("tok", &[(0.40, 10.0)], &[(0.60, 10.0)]);
        assert!(book.is_wide_spread);

        // mid = 0.50, spread = 0.02 → 4%
        let tight =
            OrderBookSnapshot::from_levels("tok", &[(0.49, 10.0)], &[(0.51, 10.0)]);
        assert!(!tight.is_wide_spread);
    }

    #[test]
    fn staleness_window_respected() {
        let mut book = OrderBookSnapshot::from_levels("tok", &[(0.4, 1.0)], &[(0.5, 1.0)]);
        assert!(!book.is_stale(std::time::Duration::from_secs(10)));

        book.captured_at = Utc::now() - Duration::seconds(11);
        assert!(book.is_stale(std::time::Duration::from_secs(10)));
    }
}
