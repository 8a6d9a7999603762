//! Remote Signing Endpoint Client
//!
//! For deployments that keep the API secret server-side: POST
//! `{method, path, body}` to the signing endpoint, get back the full
//! set of auth headers. This process never holds the secret.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::auth::{AuthHeaders, RequestSigner};

/// Request body sent to the remote signing endpoint.
#[derive(Debug, Serialize)]
struct SigningRequest<'a> {
    method: &'a str,
    path: &'a str,
    body: &'a str,
}

/// `RequestSigner` backed by a remote signing endpoint.
pub struct RemoteRequestSigner {
    http: Client,
    signing_url: String,
}

impl RemoteRequestSigner {
    /// Create a client for the given signing endpoint URL.
    pub fn new(signing_url: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build signing HTTP client")?;

        Ok(Self { http, signing_url })
    }
}

#[async_trait]
impl RequestSigner for RemoteRequestSigner {
    async fn auth_headers(
        &self,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<AuthHeaders> {
        let request = SigningRequest { method, path, body };

        let response = self
            .http
            .post(&self.signing_url)
            .json(&request)
            .send()
            .await
            .context("Signing endpoint unreachable")?;

        anyhow::ensure!(
            response.status().is_success(),
            "Signing endpoint returned {}",
            response.status()
        );

        let headers: AuthHeaders = response
            .json()
            .await
            .context("Failed to parse signing endpoint response")?;

        debug!(method, path, "Request signed remotely");
        Ok(headers)
    }
}
