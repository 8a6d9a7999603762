//! Exchange API Adapters
//!
//! HTTP client, request signing (local HMAC and remote endpoint), and
//! the `ExchangeApi` port implementation.

pub mod auth;
pub mod client;
pub mod exchange;
pub mod remote;
pub mod types;
