//! Exchange Adapter — `ExchangeApi` Port Implementation
//!
//! Implements the exchange port over the shared `ExchangeClient`
//! (inherits signing, retry logic, and concurrency limiting). Parses
//! the string-typed wire format into the f64 values the pricing and
//! execution layers consume.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::domain::session::ApiCredentials;
use crate::ports::exchange::{
    CancelOutcome, ExchangeApi, L1AuthPayload, OrderReceipt, OrderSubmission, RawOrderBook,
};

use super::client::ExchangeClient;
use super::types::{
    ApiKeyResponse, BookResponse, CancelOrderResponse, PostOrderRequest, PostOrderResponse,
};

/// CLOB exchange adapter backed by the shared authenticated client.
pub struct ClobExchange {
    client: Arc<ExchangeClient>,
}

impl ClobExchange {
    /// Create a new exchange adapter.
    pub fn new(client: Arc<ExchangeClient>) -> Self {
        Self { client }
    }

    /// Parse string levels into sorted (price, size) tuples.
    ///
    /// Bids descending, asks ascending; unparseable levels dropped.
    fn parse_levels(book: &BookResponse) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
        let parse = |levels: &[super::types::BookLevel]| -> Vec<(f64, f64)> {
            levels
                .iter()
                .filter_map(|l| {
                    let price = l.price.parse::<f64>().ok()?;
                    let size = l.size.parse::<f64>().ok()?;
                    Some((price, size))
                })
                .collect()
        };

        let mut bids = parse(&book.bids);
        let mut asks = parse(&book.asks);

        bids.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        asks.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        (bids, asks)
    }
}

#[async_trait]
impl ExchangeApi for ClobExchange {
    #[instrument(skip(self))]
    async fn get_order_book(&self, token_id: &str) -> Result<RawOrderBook> {
        let path = format!("/book?token_id={token_id}");
        let response = self
            .client
            .get(&path)
            .await
            .context("Failed to fetch order book")?;

        let book: BookResponse = response
            .json()
            .await
            .context("Failed to parse order book response")?;

        let (bids, asks) = Self::parse_levels(&book);
        let min_order_size = book
            .min_order_size
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok());

        debug!(
            token_id,
            bids = bids.len(),
            asks = asks.len(),
            "Order book fetched"
        );

        Ok(RawOrderBook {
            bids,
            asks,
            min_order_size,
        })
    }

    #[instrument(skip(self, auth), fields(owner = %auth.address))]
    async fn create_api_key(&self, auth: &L1AuthPayload) -> Result<ApiCredentials> {
        let response = self
            .client
            .send_l1("POST", "/auth/api-key", auth)
            .await
            .context("Credential creation failed")?;

        let key: ApiKeyResponse = response
            .json()
            .await
            .context("Failed to parse credential response")?;

        info!(owner = %auth.address, "API credentials created");
        Ok(ApiCredentials {
            key: key.api_key,
            secret: key.secret,
            passphrase: key.passphrase,
        })
    }

    #[instrument(skip(self, auth), fields(owner = %auth.address))]
    async fn derive_api_key(&self, auth: &L1AuthPayload) -> Result<ApiCredentials> {
        let response = self
            .client
            .send_l1("GET", "/auth/derive-api-key", auth)
            .await
            .context("Credential derivation failed")?;

        let key: ApiKeyResponse = response
            .json()
            .await
            .context("Failed to parse credential response")?;

        info!(owner = %auth.address, "API credentials derived");
        Ok(ApiCredentials {
            key: key.api_key,
            secret: key.secret,
            passphrase: key.passphrase,
        })
    }

    #[instrument(
        skip(self, order),
        fields(token = %order.token_id, side = %order.side, price = order.price)
    )]
    async fn post_order(&self, order: &OrderSubmission) -> Result<OrderReceipt> {
        let payload = PostOrderRequest {
            client_id: order.client_order_id.clone(),
            token_id: order.token_id.clone(),
            price: format!("{:.2}", order.price),
            amount: format!("{:.2}", order.amount),
            side: order.side.clone(),
            order_type: order.order_type.clone(),
        };
        let body = serde_json::to_string(&payload)?;

        let response = self
            .client
            .post("/order", &body)
            .await
            .context("Failed to submit order")?;

        let parsed: PostOrderResponse = response
            .json()
            .await
            .context("Failed to parse order response")?;

        if parsed.success {
            info!(order_id = ?parsed.order_id, "Order accepted");
        } else {
            warn!(reason = ?parsed.error_msg, "Order rejected by exchange");
        }

        Ok(OrderReceipt {
            order_id: parsed.order_id.unwrap_or_default(),
            accepted: parsed.success,
            error: parsed.error_msg,
        })
    }

    #[instrument(skip(self))]
    async fn cancel_order(&self, order_id: &str) -> Result<CancelOutcome> {
        let body = serde_json::json!({ "orderID": order_id }).to_string();

        let result = self.client.delete("/order", &body).await;

        let response = match result {
            Ok(r) => r,
            // Cancelling a gone order is a no-op, not a failure.
            Err(e) if is_noop_cancel(&e.to_string()) => {
                debug!(order_id, "Cancel was a no-op");
                return Ok(CancelOutcome::NoOp);
            }
            Err(e) => return Err(e),
        };

        let parsed: CancelOrderResponse = response
            .json()
            .await
            .context("Failed to parse cancel response")?;

        if parsed.success {
            Ok(CancelOutcome::Cancelled)
        } else if parsed
            .error_msg
            .as_deref()
            .is_some_and(is_noop_cancel)
        {
            Ok(CancelOutcome::NoOp)
        } else {
            anyhow::bail!(
                "Cancel failed: {}",
                parsed.error_msg.unwrap_or_else(|| "unknown".into())
            )
        }
    }
}

/// Error text meaning the order was already filled/cancelled/unknown.
fn is_noop_cancel(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("not found")
        || lowered.contains("already canceled")
        || lowered.contains("already cancelled")
        || lowered.contains("already filled")
}
