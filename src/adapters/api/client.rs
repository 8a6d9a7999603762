//! Exchange HTTP Client - Rate-limited REST API Client
//!
//! Wraps reqwest with concurrency limiting, retries, and request
//! signing for all CLOB REST interactions. Credentials are installed
//! after the orchestrator derives them; until then only unsigned and
//! L1-authenticated endpoints are usable.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::sync::{RwLock, Semaphore};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::ports::exchange::L1AuthPayload;

use super::auth::RequestSigner;

/// Configuration for the exchange HTTP client.
#[derive(Debug, Clone)]
pub struct ExchangeClientConfig {
  /// Base URL for the CLOB API.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
  /// Maximum retries on transient errors.
  pub max_retries: u32,
  /// Base delay between retries (exponential backoff).
  pub retry_base_delay: Duration,
}

impl Default for ExchangeClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://clob.polymarket.com".to_string(),
      timeout: Duration::from_secs(30),
      max_concurrent: 10,
      max_retries: 3,
      retry_base_delay: Duration::from_millis(200),
    }
  }
}

/// Rate-limited HTTP client for the exchange REST API.
pub struct ExchangeClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: ExchangeClientConfig,
  /// Request signer, installed once session credentials exist.
  signer: RwLock<Option<Arc<dyn RequestSigner>>>,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
}

impl ExchangeClient {
  /// Create a new exchange client without credentials.
  pub fn new(config: ExchangeClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent));

    Ok(Self {
      http,
      config,
      signer: RwLock::new(None),
      semaphore,
    })
  }

  /// Install a request signer (called after credential derivation).
  pub async fn install_signer(&self, signer: Arc<dyn RequestSigner>) {
    let mut guard = self.signer.write().await;
    *guard = Some(signer);
  }

  /// Whether a request signer is installed.
  pub async fn has_signer(&self) -> bool {
    self.signer.read().await.is_some()
  }

  /// Execute a GET request with auth headers and retries.
  pub async fn get(&self, path: &str) -> Result<Response> {
    let url = format!("{}{}", self.config.base_url, path);
    let request = self.http.get(&url);
    self.execute_with_retry(request, "GET", path, "").await
  }

  /// Execute a POST request with auth headers and retries.
  pub async fn post(&self, path: &str, body: &str) -> Result<Response> {
    let url = format!("{}{}", self.config.base_url, path);
    let request = self
      .http
      .post(&url)
      .header("Content-Type", "application/json")
      .body(body.to_string());
    self.execute_with_retry(request, "POST", path, body).await
  }

  /// Execute a DELETE request with auth headers and retries.
  pub async fn delete(&self, path: &str, body: &str) -> Result<Response> {
    let url = format!("{}{}", self.config.base_url, path);
    let request = self
      .http
      .delete(&url)
      .header("Content-Type", "application/json")
      .body(body.to_string());
    self.execute_with_retry(request, "DELETE", path, body).await
  }

  /// Execute a request authenticated by an owner-key (L1) signature
  /// instead of derived credentials. Used by the credential
  /// create/derive endpoints, which precede credential existence.
  pub async fn send_l1(
    &self,
    method: &str,
    path: &str,
    auth: &L1AuthPayload,
  ) -> Result<Response> {
    let _permit = self.semaphore.acquire().await.context("Semaphore closed")?;

    let url = format!("{}{}", self.config.base_url, path);
    let request = match method {
      "POST" => self.http.post(&url),
      _ => self.http.get(&url),
    };

    let response = request
      .header("POLY_ADDRESS", auth.address.to_string())
      .header("POLY_SIGNATURE", &auth.signature)
      .header("POLY_TIMESTAMP", &auth.timestamp)
      .header("POLY_NONCE", auth.nonce.to_string())
      .send()
      .await
      .context("L1-authenticated request failed")?;

    Self::check_status(response).await
  }

  /// Execute request with signing, concurrency limiting, and retries.
  ///
  /// 429 and 5xx responses are retried with exponential backoff; any
  /// other error status is returned immediately with the body text so
  /// callers can classify it.
  async fn execute_with_retry(
    &self,
    request: RequestBuilder,
    method: &str,
    path: &str,
    body: &str,
  ) -> Result<Response> {
    let _permit = self.semaphore.acquire().await.context("Semaphore closed")?;

    let mut last_error = None;

    for attempt in 0..=self.config.max_retries {
      if attempt > 0 {
        let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
        debug!(attempt, delay_ms = delay.as_millis(), "Retrying request");
        sleep(delay).await;
      }

      let mut req = request.try_clone().context("Failed to clone request")?;

      // Attach signed auth headers when credentials are installed
      let signer = { self.signer.read().await.clone() };
      if let Some(signer) = signer {
        let headers = signer.auth_headers(method, path, body).await?;
        req = req
          .header("POLY_API_KEY", &headers.key)
          .header("POLY_SIGNATURE", &headers.signature)
          .header("POLY_TIMESTAMP", &headers.timestamp)
          .header("POLY_PASSPHRASE", &headers.passphrase);
      }

      match req.send().await {
        Ok(response) => match response.status() {
          StatusCode::OK | StatusCode::CREATED => return Ok(response),
          StatusCode::TOO_MANY_REQUESTS => {
            warn!("Rate limited by exchange API, backing off");
            sleep(Duration::from_secs(2)).await;
            last_error = Some(anyhow::anyhow!("Rate limited"));
            continue;
          }
          status if status.is_server_error() => {
            warn!(status = %status, "Server error, retrying");
            last_error = Some(anyhow::anyhow!("Server error: {status}"));
            continue;
          }
          status => {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("API error {status}: {body}"));
          }
        },
        Err(e) => {
          warn!(error = %e, attempt, "Request failed");
          last_error = Some(e.into());
          continue;
        }
      }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Max retries exceeded")))
  }

  /// Convert a non-success response into an error carrying the body.
  async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
      Ok(response)
    } else {
      let body = response.text().await.unwrap_or_default();
      Err(anyhow::anyhow!("API error {status}: {body}"))
    }
  }

  /// Check if the API is reachable.
  pub async fn health_check(&self) -> bool {
    self.get("/time").await.is_ok()
  }
}
