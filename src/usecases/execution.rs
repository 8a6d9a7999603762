//! Order Execution Engine - Intent to Exchange Order
//!
//! Turns an `OrderIntent` into an exchange submission: validate the
//! intent, read a fresh book, compute the marketable price, enforce
//! minimum-size and balance gates, then post. Market orders go out
//! fill-or-kill, limit orders good-till-cancelled. Every attempt,
//! successful or not, invalidates the cached book it priced against.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::TradingConfig;
use crate::domain::error::{TradeError, classify_submission_error};
use crate::domain::intent::{OrderIntent, Side};
use crate::ports::chain::ChainReader;
use crate::ports::exchange::{CancelOutcome, ExchangeApi, OrderSubmission};
use crate::usecases::pricer::{OrderBookPricer, buffered_price};

/// Collateral token decimals (USDC-style).
const COLLATERAL_DECIMALS: f64 = 1e6;

/// Execution-side knobs lifted from config.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionPolicy {
  /// Minimum order size when neither intent nor book provides one.
  pub default_min_order_size: f64,
  /// Skip the pre-trade balance read.
  pub bypass_balance_check: bool,
  /// Log and return without posting anything.
  pub dry_run: bool,
}

impl ExecutionPolicy {
  pub fn from_config(trading: &TradingConfig, dry_run: bool) -> Self {
    Self {
      default_min_order_size: trading.default_min_order_size,
      bypass_balance_check: trading.bypass_balance_check,
      dry_run,
    }
  }
}

/// What actually went to the exchange, for callers and logs.
#[derive(Debug, Clone)]
pub struct ExecutedOrder {
  /// Exchange-assigned id; synthetic `dry-run` id in dry-run mode.
  pub order_id: String,
  /// Caller-side id generated for this attempt.
  pub client_order_id: String,
  /// Final submitted price.
  pub price: f64,
  /// Submitted amount (collateral for market buys, shares otherwise).
  pub amount: f64,
  /// Estimated shares received for market buys, `amount` otherwise.
  pub estimated_shares: f64,
}

/// Drives single order attempts against the exchange.
pub struct OrderExecutionEngine<E: ExchangeApi, C: ChainReader> {
  exchange: Arc<E>,
  chain: Arc<C>,
  pricer: Arc<OrderBookPricer<E>>,
  collateral: Address,
  policy: ExecutionPolicy,
}

impl<E: ExchangeApi, C: ChainReader> OrderExecutionEngine<E, C> {
  pub fn new(
    exchange: Arc<E>,
    chain: Arc<C>,
    pricer: Arc<OrderBookPricer<E>>,
    collateral: Address,
    policy: ExecutionPolicy,
  ) -> Self {
    Self {
      exchange,
      chain,
      pricer,
      collateral,
      policy,
    }
  }

  /// Submit one order on behalf of `proxy`.
  ///
  /// Order failures never touch session state; the caller may retry
  /// with a fresh intent. `SignerNotReady` specifically means the
  /// owner should reconnect, not retry blindly.
  #[instrument(skip(self, intent), fields(token_id = %intent.token_id, side = %intent.side))]
  pub async fn submit(
    &self,
    proxy: Address,
    intent: &OrderIntent,
  ) -> Result<ExecutedOrder, TradeError> {
    intent.validate()?;

    let book = self.pricer.snapshot(&intent.token_id).await;
    if let Ok(book) = &book {
      if book.is_low_liquidity {
        warn!("Pricing against a one-sided book");
      }
    }

    let price = match intent.limit_price {
      Some(limit) => limit,
      None => self.marketable_price(intent, book.as_ref().ok())?,
    };

    let (amount, amount_is_collateral) = match (intent.side, intent.is_market) {
      (Side::Buy, true) => (intent.stake.unwrap_or(0.0), true),
      _ => (intent.share_size.unwrap_or(0.0), false),
    };

    // The book's minimum is denominated in shares. Collateral-sized
    // orders are gated against its stake equivalent at the execution
    // price, so a small stake that still buys enough shares passes.
    let min_shares = intent
      .min_order_size
      .or(self.pricer.min_order_size(&intent.token_id).await)
      .unwrap_or(self.policy.default_min_order_size);
    let minimum = if amount_is_collateral {
      min_shares * price
    } else {
      min_shares
    };
    if amount < minimum {
      return Err(TradeError::BelowMinimumOrder {
        minimum,
        got: amount,
      });
    }

    if amount_is_collateral && !self.policy.bypass_balance_check {
      self.check_balance(proxy, amount).await?;
    }

    let submission = OrderSubmission {
      client_order_id: Uuid::new_v4().to_string(),
      token_id: intent.token_id.clone(),
      side: intent.side.to_string(),
      price,
      amount,
      order_type: if intent.is_market { "FOK" } else { "GTC" }.to_string(),
      amount_is_collateral,
    };

    let estimated_shares = if amount_is_collateral && price > 0.0 {
      amount / price
    } else {
      amount
    };

    if self.policy.dry_run {
      info!(price, amount, estimated_shares, "Dry run: order not submitted");
      self.pricer.invalidate(&intent.token_id).await;
      return Ok(ExecutedOrder {
        order_id: "dry-run".to_string(),
        client_order_id: submission.client_order_id,
        price,
        amount,
        estimated_shares,
      });
    }

    let result = self.exchange.post_order(&submission).await;
    // The attempt consumed or disturbed the book it was priced from.
    self.pricer.invalidate(&intent.token_id).await;

    let receipt = result.map_err(|e| classify_submission_error(&e.to_string()))?;
    if !receipt.accepted {
      let reason = receipt.error.unwrap_or_else(|| "rejected".to_string());
      return Err(classify_submission_error(&reason));
    }

    info!(
      order_id = %receipt.order_id,
      price,
      amount,
      estimated_shares,
      "Order accepted"
    );
    Ok(ExecutedOrder {
      order_id: receipt.order_id,
      client_order_id: submission.client_order_id,
      price,
      amount,
      estimated_shares,
    })
  }

  /// Cancel a resting order. Idempotent: a no-op outcome is success.
  #[instrument(skip(self))]
  pub async fn cancel(&self, order_id: &str) -> Result<CancelOutcome, TradeError> {
    if self.policy.dry_run {
      info!("Dry run: cancel not submitted");
      return Ok(CancelOutcome::NoOp);
    }

    self
      .exchange
      .cancel_order(order_id)
      .await
      .map_err(|e| TradeError::OrderSubmissionFailed(e.to_string()))
  }

  /// Execution price for a market order.
  ///
  /// Live book first; when no usable book exists, the caller's
  /// reference price (buffered the same way) is the last resort.
  fn marketable_price(
    &self,
    intent: &OrderIntent,
    book: Option<&crate::domain::book::OrderBookSnapshot>,
  ) -> Result<f64, TradeError> {
    if let Some(book) = book {
      if let Ok(price) = self
        .pricer
        .execution_price(book, intent.direction, intent.side)
      {
        return Ok(price);
      }
    }

    let reference = intent
      .fallback_price
      .ok_or(TradeError::InsufficientLiquidity)?;
    warn!(reference, "No usable book, pricing from reference");
    let policy = self.pricer.policy();
    Ok(buffered_price(
      reference,
      intent.side,
      policy.buffer,
      policy.max_price,
    ))
  }

  /// Verify the proxy can cover the stake.
  ///
  /// A failed read degrades to a warning: blocking trades on an RPC
  /// hiccup is worse than letting the exchange reject an over-spend.
  async fn check_balance(&self, proxy: Address, stake: f64) -> Result<(), TradeError> {
    match self.chain.erc20_balance(self.collateral, proxy).await {
      Ok(raw) => {
        let available =
          u128::try_from(raw).unwrap_or(u128::MAX) as f64 / COLLATERAL_DECIMALS;
        if stake > available {
          return Err(TradeError::InsufficientBalance {
            available,
            requested: stake,
          });
        }
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "Balance read failed, proceeding without check");
        Ok(())
      }
    }
  }
}
