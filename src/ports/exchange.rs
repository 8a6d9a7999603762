//! Exchange API Port - CLOB Surface
//!
//! Order book snapshots, credential create/derive, and order
//! submit/cancel. All calls are synchronous request/response; there is
//! no streaming requirement in this core.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::session::ApiCredentials;

/// Raw order book as fetched from the exchange, pre-domain.
///
/// Bids sorted descending by price, asks ascending. The adapter
/// guarantees ordering.
#[derive(Debug, Clone)]
pub struct RawOrderBook {
  /// Bid levels: (price, size).
  pub bids: Vec<(f64, f64)>,
  /// Ask levels: (price, size).
  pub asks: Vec<(f64, f64)>,
  /// Instrument minimum order size, when the source provides one.
  pub min_order_size: Option<f64>,
}

/// Owner-key ("L1") authentication payload for credential endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct L1AuthPayload {
  /// Owner address the signature attests for.
  pub address: Address,
  /// Unix timestamp (seconds) included in the signed message.
  pub timestamp: String,
  /// Replay-protection nonce.
  pub nonce: u64,
  /// 0x-prefixed hex signature over the attestation message.
  pub signature: String,
}

/// Order payload the execution engine submits.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmission {
  /// Caller-generated id for idempotent retry bookkeeping.
  pub client_order_id: String,
  /// Token to trade.
  pub token_id: String,
  /// "BUY" or "SELL".
  pub side: String,
  /// Execution or limit price.
  pub price: f64,
  /// Submitted amount (see `amount_is_collateral`).
  pub amount: f64,
  /// "FOK" for market orders, "GTC" for limit orders.
  pub order_type: String,
  /// BUY market orders denominate collateral to spend; everything
  /// else denominates instrument units.
  pub amount_is_collateral: bool,
}

/// Exchange response to an order submission.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderReceipt {
  /// Exchange-assigned order id (empty on rejection).
  pub order_id: String,
  /// Whether the order was accepted.
  pub accepted: bool,
  /// Rejection text when not accepted.
  pub error: Option<String>,
}

/// Outcome of a cancellation attempt.
///
/// Cancelling an already-filled or already-cancelled order is a
/// `NoOp`, never a distinct failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
  Cancelled,
  NoOp,
}

/// Trait for the exchange REST surface.
#[async_trait]
pub trait ExchangeApi: Send + Sync + 'static {
  /// Fetch the current order book for a token.
  async fn get_order_book(&self, token_id: &str) -> anyhow::Result<RawOrderBook>;

  /// Create new trading credentials for the signing owner.
  ///
  /// Fails when credentials already exist; callers fall back to
  /// `derive_api_key`.
  async fn create_api_key(&self, auth: &L1AuthPayload) -> anyhow::Result<ApiCredentials>;

  /// Derive previously created credentials for the signing owner.
  async fn derive_api_key(&self, auth: &L1AuthPayload) -> anyhow::Result<ApiCredentials>;

  /// Submit an order. Requires installed credentials.
  async fn post_order(&self, order: &OrderSubmission) -> anyhow::Result<OrderReceipt>;

  /// Cancel an order by id. Idempotent.
  async fn cancel_order(&self, order_id: &str) -> anyhow::Result<CancelOutcome>;
}
