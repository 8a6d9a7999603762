//! Order intents — one ephemeral value per user action.
//!
//! Denomination rules: BUY market orders carry a collateral `stake`
//! to spend; SELL orders (market or limit) and all limit orders carry
//! a `share_size` in instrument units, and limit orders always require
//! an explicit price.

use serde::{Deserialize, Serialize};

use super::error::TradeError;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Outcome direction within a market pair.
///
/// `Yes` is the primary-liquidity (base) side; `No` prices are derived
/// from the base book as `1 - best_bid(base)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Yes,
    No,
}

/// A single order request from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Tradable token identifier.
    pub token_id: String,
    /// Buy or sell.
    pub side: Side,
    /// Outcome direction the caller is taking.
    pub direction: Direction,
    /// Collateral to spend (BUY market orders only).
    pub stake: Option<f64>,
    /// Instrument units (SELL and all limit orders).
    pub share_size: Option<f64>,
    /// Market (fill-or-kill) vs limit (good-till-cancelled).
    pub is_market: bool,
    /// Explicit price, required for limit orders.
    pub limit_price: Option<f64>,
    /// Caller-supplied reference price (e.g. implied odds), used only
    /// when no usable book exists.
    pub fallback_price: Option<f64>,
    /// Instrument minimum size; defaulted from config when absent.
    pub min_order_size: Option<f64>,
}

impl OrderIntent {
    /// BUY market order spending `stake` collateral units.
    pub fn market_buy(token_id: impl Into<String>, direction: Direction, stake: f64) -> Self {
        Self {
            token_id: token_id.into(),
            side: Side::Buy,
            direction,
            stake: Some(stake),
            share_size: None,
            is_market: true,
            limit_price: None,
            fallback_price: None,
            min_order_size: None,
        }
    }

    /// SELL market order for `share_size` instrument units.
    pub fn market_sell(
        token_id: impl Into<String>,
        direction: Direction,
        share_size: f64,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            side: Side::Sell,
            direction,
            stake: None,
            share_size: Some(share_size),
            is_market: true,
            limit_price: None,
            fallback_price: None,
            min_order_size: None,
        }
    }

    /// Limit order resting at `price` for `share_size` units.
    pub fn limit(
        token_id: impl Into<String>,
        direction: Direction,
        side: Side,
        price: f64,
        share_size: f64,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            side,
            direction,
            stake: None,
            share_size: Some(share_size),
            is_market: false,
            limit_price: Some(price),
            fallback_price: None,
            min_order_size: None,
        }
    }

    /// Set a reference price for books with no usable liquidity.
    pub fn with_fallback_price(mut self, price: f64) -> Self {
        self.fallback_price = Some(price);
        self
    }

    /// Override the instrument minimum (source-provided).
    pub fn with_min_order_size(mut self, min: f64) -> Self {
        self.min_order_size = Some(min);
        self
    }

    /// Check denomination rules before any pricing work happens.
    pub fn validate(&self) -> Result<(), TradeError> {
        if self.token_id.is_empty() {
            return Err(TradeError::InvalidIntent("empty token id".into()));
        }

        if !self.is_market && self.limit_price.is_none() {
            return Err(TradeError::InvalidIntent(
                "limit orders require an explicit price".into(),
            ));
        }

        if let Some(price) = self.limit_price {
            if !(0.0..=1.0).contains(&price) || price == 0.0 {
                return Err(TradeError::InvalidIntent(format!(
                    "limit price {price} outside (0, 1]"
                )));
            }
        }

        match (self.side, self.is_market) {
            // BUY market: collateral stake to spend.
            (Side::Buy, true) => match self.stake {
                Some(stake) if stake > 0.0 => Ok(()),
                Some(stake) => Err(TradeError::BelowMinimumOrder {
                    minimum: 0.0,
                    got: stake,
                }),
                None => Err(TradeError::InvalidIntent(
                    "market buy requires a stake".into(),
                )),
            },
            // SELL and all limit orders: instrument units.
            _ => match self.share_size {
                Some(size) if size > 0.0 => Ok(()),
                Some(size) => Err(TradeError::BelowMinimumOrder {
                    minimum: 0.0,
                    got: size,
                }),
                None => Err(TradeError::InvalidIntent(
                    "sell/limit orders require a share size".into(),
                )),
            },
        }
    }
}
