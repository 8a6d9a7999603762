//! CLOB API Request/Response Types
//!
//! Serialization types for the exchange REST surface. All types
//! derive Serialize/Deserialize for JSON transport; prices and sizes
//! arrive as strings and are parsed at the adapter boundary.

use serde::{Deserialize, Serialize};

/// Order book level from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct BookLevel {
  /// Price at this level.
  pub price: String,
  /// Total size at this level.
  pub size: String,
}

/// Order book response from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct BookResponse {
  /// Bid levels (price descending).
  pub bids: Vec<BookLevel>,
  /// Ask levels (price ascending).
  pub asks: Vec<BookLevel>,
  /// Instrument minimum order size, when provided.
  #[serde(rename = "min_order_size")]
  pub min_order_size: Option<String>,
  /// Snapshot timestamp.
  pub timestamp: Option<String>,
}

/// Credential create/derive response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyResponse {
  /// API key identifier.
  #[serde(rename = "apiKey")]
  pub api_key: String,
  /// HMAC secret (base64).
  pub secret: String,
  /// Passphrase.
  pub passphrase: String,
}

/// Order request payload for the CLOB API.
#[derive(Debug, Clone, Serialize)]
pub struct PostOrderRequest {
  /// Caller-generated client order id.
  #[serde(rename = "clientID")]
  pub client_id: String,
  /// Token ID to trade.
  #[serde(rename = "tokenID")]
  pub token_id: String,
  /// Price as a decimal string.
  pub price: String,
  /// Submitted amount as a decimal string.
  pub amount: String,
  /// "BUY" or "SELL".
  pub side: String,
  /// "FOK" (market) or "GTC" (limit).
  #[serde(rename = "orderType")]
  pub order_type: String,
}

/// Response from order creation.
#[derive(Debug, Clone, Deserialize)]
pub struct PostOrderResponse {
  /// Whether the order was accepted.
  pub success: bool,
  /// Assigned order ID.
  #[serde(rename = "orderID")]
  pub order_id: Option<String>,
  /// Error message if rejected.
  #[serde(rename = "errorMsg")]
  pub error_msg: Option<String>,
}

/// Cancel response.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrderResponse {
  /// Whether cancellation succeeded.
  pub success: bool,
  /// Error message if failed.
  #[serde(rename = "errorMsg")]
  pub error_msg: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_post_order_request_serialization() {
    let req = PostOrderRequest {
      client_id: "c-1".to_string(),
      token_id: "token_123".to_string(),
      price: "0.43".to_string(),
      amount: "20.00".to_string(),
      side: "BUY".to_string(),
      order_type: "FOK".to_string(),
    };

    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("token_123"));
    assert!(json.contains("\"orderType\":\"FOK\""));
  }

  #[test]
  fn test_post_order_response_deserialization() {
    let json = r#"{"success": true, "orderID": "order_abc"}"#;
    let resp: PostOrderResponse = serde_json::from_str(json).unwrap();
    assert!(resp.success);
    assert_eq!(resp.order_id.unwrap(), "order_abc");
  }

  #[test]
  fn test_book_response_with_string_levels() {
    let json = r#"{
      "bids": [{"price": "0.40", "size": "100"}],
      "asks": [{"price": "0.44", "size": "80"}],
      "min_order_size": "5",
      "timestamp": "1700000000"
    }"#;
    let book: BookResponse = serde_json::from_str(json).unwrap();
    assert_eq!(book.bids.len(), 1);
    assert_eq!(book.min_order_size.as_deref(), Some("5"));
  }
}
