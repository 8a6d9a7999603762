//! Relayer HTTP Client - `RelayerApi` Port Implementation
//!
//! Talks to the gas-sponsoring relayer: proxy deployment, batched
//! proxy execution, deployment lookups, and transaction status polls.
//! Single-shot requests; the bounded polling loops live in the
//! usecases layer where interval and deadline are config inputs.

use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::ports::relayer::{ProxyTransaction, RelayTxStatus, RelayerApi};

/// Deployment lookup response.
#[derive(Debug, Deserialize)]
struct DeployedResponse {
  deployed: bool,
}

/// Relay submission response.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
  #[serde(rename = "transactionID")]
  transaction_id: String,
}

/// Transaction status response.
#[derive(Debug, Deserialize)]
struct StatusResponse {
  state: String,
  #[serde(default)]
  reason: Option<String>,
}

/// HTTP client for the relayer surface.
pub struct HttpRelayer {
  http: Client,
  base_url: String,
}

impl HttpRelayer {
  /// Create a relayer client for the given base URL.
  pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
    let http = Client::builder()
      .timeout(timeout)
      .build()
      .context("Failed to build relayer HTTP client")?;

    Ok(Self { http, base_url })
  }

  /// Convert a non-success response into an error carrying the body,
  /// so callers can classify relayer failure text (e.g. "already
  /// deployed").
  async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
      Ok(response)
    } else {
      let body = response.text().await.unwrap_or_default();
      Err(anyhow::anyhow!("Relayer error {status}: {body}"))
    }
  }
}

#[async_trait]
impl RelayerApi for HttpRelayer {
  #[instrument(skip(self), fields(proxy = %proxy))]
  async fn is_proxy_deployed(&self, proxy: Address) -> Result<bool> {
    let url = format!("{}/proxy/{}", self.base_url, proxy);
    let response = self
      .http
      .get(&url)
      .send()
      .await
      .context("Deployment lookup failed")?;

    let parsed: DeployedResponse = Self::check(response)
      .await?
      .json()
      .await
      .context("Failed to parse deployment lookup")?;

    Ok(parsed.deployed)
  }

  #[instrument(skip(self), fields(owner = %owner))]
  async fn deploy_proxy(&self, owner: Address, factory: Address) -> Result<String> {
    let url = format!("{}/deploy", self.base_url);
    let body = serde_json::json!({
      "owner": owner,
      "factory": factory,
    });

    let response = self
      .http
      .post(&url)
      .json(&body)
      .send()
      .await
      .context("Deploy request failed")?;

    let parsed: SubmitResponse = Self::check(response)
      .await?
      .json()
      .await
      .context("Failed to parse deploy response")?;

    info!(tx_id = %parsed.transaction_id, "Proxy deployment submitted");
    Ok(parsed.transaction_id)
  }

  #[instrument(skip(self, transactions), fields(proxy = %proxy, batch = transactions.len()))]
  async fn submit_batch(
    &self,
    proxy: Address,
    transactions: &[ProxyTransaction],
  ) -> Result<String> {
    let url = format!("{}/submit", self.base_url);
    let body = serde_json::json!({
      "from": proxy,
      "transactions": transactions,
    });

    let response = self
      .http
      .post(&url)
      .json(&body)
      .send()
      .await
      .context("Batch submission failed")?;

    let parsed: SubmitResponse = Self::check(response)
      .await?
      .json()
      .await
      .context("Failed to parse batch response")?;

    info!(tx_id = %parsed.transaction_id, "Batch submitted through proxy");
    Ok(parsed.transaction_id)
  }

  async fn transaction_status(&self, tx_id: &str) -> Result<RelayTxStatus> {
    let url = format!("{}/transaction/{}", self.base_url, tx_id);
    let response = self
      .http
      .get(&url)
      .send()
      .await
      .context("Status poll failed")?;

    let parsed: StatusResponse = Self::check(response)
      .await?
      .json()
      .await
      .context("Failed to parse status response")?;

    let status = match parsed.state.to_uppercase().as_str() {
      "STATE_NEW" | "STATE_EXECUTED" | "PENDING" => RelayTxStatus::Pending,
      "STATE_MINED" | "MINED" => RelayTxStatus::Mined,
      "STATE_CONFIRMED" | "CONFIRMED" => RelayTxStatus::Confirmed,
      "STATE_FAILED" | "FAILED" => {
        RelayTxStatus::Failed(parsed.reason.unwrap_or_else(|| "unknown".into()))
      }
      other => {
        debug!(state = other, "Unrecognized relay state, treating as pending");
        RelayTxStatus::Pending
      }
    };

    Ok(status)
  }
}
