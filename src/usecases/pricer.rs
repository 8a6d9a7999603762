//! Order Book Pricer - Cached Books and Execution Pricing
//!
//! Caches top-of-book snapshots per token and turns them into
//! marketable execution prices. Prices for the No direction are
//! derived from the base (Yes) book as the complement. A buffer is
//! added toward the taker's worse side so fill-or-kill orders survive
//! small book moves, clamped to the configured price ceiling.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::TradingConfig;
use crate::domain::book::OrderBookSnapshot;
use crate::domain::error::TradeError;
use crate::domain::intent::{Direction, Side};
use crate::ports::exchange::ExchangeApi;

/// Pricing parameters, lifted from config once at startup.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
  /// Buffer added toward the taker's worse side.
  pub buffer: f64,
  /// Execution price ceiling; the floor is its complement.
  pub max_price: f64,
  /// Snapshots older than this must be refreshed before pricing.
  pub staleness: Duration,
  /// Background refresh cadence for watched tokens.
  pub refresh_interval: Duration,
}

impl PricingPolicy {
  pub fn from_config(trading: &TradingConfig) -> Self {
    Self {
      buffer: trading.price_buffer,
      max_price: trading.max_price,
      staleness: Duration::from_secs(trading.staleness_secs),
      refresh_interval: Duration::from_secs(trading.refresh_interval_secs),
    }
  }
}

struct CachedBook {
  snapshot: OrderBookSnapshot,
  min_order_size: Option<f64>,
}

/// Serves execution prices from cached, staleness-guarded books.
pub struct OrderBookPricer<E: ExchangeApi> {
  exchange: Arc<E>,
  policy: PricingPolicy,
  cache: RwLock<HashMap<String, CachedBook>>,
}

impl<E: ExchangeApi> OrderBookPricer<E> {
  pub fn new(exchange: Arc<E>, policy: PricingPolicy) -> Self {
    Self {
      exchange,
      policy,
      cache: RwLock::new(HashMap::new()),
    }
  }

  pub fn policy(&self) -> PricingPolicy {
    self.policy
  }

  /// Current book for a token, refreshing when stale or absent.
  ///
  /// A fetch failure with no usable cached book means the token
  /// cannot be priced at all.
  #[instrument(skip(self))]
  pub async fn snapshot(&self, token_id: &str) -> Result<OrderBookSnapshot, TradeError> {
    {
      let cache = self.cache.read().await;
      if let Some(cached) = cache.get(token_id) {
        if !cached.snapshot.is_stale(self.policy.staleness) {
          return Ok(cached.snapshot.clone());
        }
        debug!(age_secs = cached.snapshot.age_secs(), "Cached book stale, refreshing");
      }
    }

    match self.refresh(token_id).await {
      Ok(snapshot) => Ok(snapshot),
      Err(e) => {
        warn!(error = %e, "Book refresh failed");
        Err(TradeError::InsufficientLiquidity)
      }
    }
  }

  /// Fetch a fresh book and replace the cache entry.
  pub async fn refresh(&self, token_id: &str) -> anyhow::Result<OrderBookSnapshot> {
    let raw = self.exchange.get_order_book(token_id).await?;
    let snapshot = OrderBookSnapshot::from_levels(token_id, &raw.bids, &raw.asks);

    let mut cache = self.cache.write().await;
    cache.insert(
      token_id.to_string(),
      CachedBook {
        snapshot: snapshot.clone(),
        min_order_size: raw.min_order_size,
      },
    );
    Ok(snapshot)
  }

  /// Source-provided minimum order size, when the book carried one.
  pub async fn min_order_size(&self, token_id: &str) -> Option<f64> {
    let cache = self.cache.read().await;
    cache.get(token_id).and_then(|c| c.min_order_size)
  }

  /// Drop a cached book, forcing the next read to refetch.
  ///
  /// Called after any fill attempt: the submitted order consumed or
  /// disturbed the very liquidity the cache describes.
  pub async fn invalidate(&self, token_id: &str) {
    let mut cache = self.cache.write().await;
    cache.remove(token_id);
  }

  /// Marketable execution price for a direction and side.
  pub fn execution_price(
    &self,
    book: &OrderBookSnapshot,
    direction: Direction,
    side: Side,
  ) -> Result<f64, TradeError> {
    let raw = raw_execution_price(book, direction, side)
      .ok_or(TradeError::InsufficientLiquidity)?;
    Ok(buffered_price(raw, side, self.policy.buffer, self.policy.max_price))
  }

  /// Background refresh loop for a fixed token watch list.
  ///
  /// Failures are logged and retried on the next tick; the loop exits
  /// on the shutdown signal.
  pub fn spawn_refresh(
    self: &Arc<Self>,
    tokens: Vec<String>,
    mut shutdown: broadcast::Receiver<()>,
  ) -> JoinHandle<()> {
    let pricer = Arc::clone(self);

    tokio::spawn(async move {
      let mut ticker = tokio::time::interval(pricer.policy.refresh_interval);
      info!(tokens = tokens.len(), "Order book refresh loop started");

      loop {
        tokio::select! {
          _ = ticker.tick() => {
            for token_id in &tokens {
              if let Err(e) = pricer.refresh(token_id).await {
                warn!(token_id, error = %e, "Scheduled book refresh failed");
              }
            }
          }
          _ = shutdown.recv() => {
            info!("Order book refresh loop stopping");
            break;
          }
        }
      }
    })
  }
}

/// Unbuffered execution price from the base-side book.
///
/// Yes trades read their own side of the book; No trades take the
/// complement of the opposite side, because No liquidity is the
/// mirror of the base book. When the marketable side is empty the
/// resting side serves as a reference price rather than failing
/// outright.
pub fn raw_execution_price(
  book: &OrderBookSnapshot,
  direction: Direction,
  side: Side,
) -> Option<f64> {
  match (direction, side) {
    (Direction::Yes, Side::Buy) => book.best_ask.or(book.best_bid),
    (Direction::Yes, Side::Sell) => book.best_bid.or(book.best_ask),
    (Direction::No, Side::Buy) => book
      .best_bid
      .map(|bid| 1.0 - bid)
      .or(book.best_ask.map(|ask| 1.0 - ask)),
    (Direction::No, Side::Sell) => book
      .best_ask
      .map(|ask| 1.0 - ask)
      .or(book.best_bid.map(|bid| 1.0 - bid)),
  }
}

/// Apply the marketability buffer toward the taker's worse side.
///
/// Buys pay up, sells give way; both are clamped inside
/// `[1 - max_price, max_price]`.
pub fn buffered_price(raw: f64, side: Side, buffer: f64, max_price: f64) -> f64 {
  match side {
    Side::Buy => (raw + buffer).min(max_price),
    Side::Sell => (raw - buffer).max(1.0 - max_price),
  }
}
