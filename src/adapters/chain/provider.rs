//! RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the connection to the chain RPC used for fallback reads.
//! Validates connectivity and chain id at startup and exposes a shared
//! provider instance.
//!
//! In alloy 0.9, `ProviderBuilder::new().on_http()` returns a complex
//! filler type. We store it as a type-erased `dyn Provider` to keep
//! the API clean across the adapter layer.

use std::sync::Arc;

use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::http::{Client, Http};
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::config::ApiConfig;

/// Shared RPC provider backed by alloy-rs 0.9.
///
/// All chain adapters share a single provider instance to avoid
/// redundant connections and enable connection pooling.
pub struct RpcProvider {
    /// The alloy HTTP provider (type-erased over the HTTP transport).
    provider: Arc<dyn Provider<Http<Client>> + Send + Sync>,
}

impl RpcProvider {
    /// Connect to the RPC endpoint and validate the chain id.
    ///
    /// The URL and expected chain id come from `config.toml`; a
    /// mismatch is a startup failure, never a silent fallback.
    #[instrument(skip_all)]
    pub async fn connect(config: &ApiConfig) -> Result<Self> {
        // alloy 0.9: on_http() is synchronous, returns impl Provider
        let provider = ProviderBuilder::new()
            .on_http(config.rpc_url.parse().context("Invalid RPC URL")?);

        let provider: Arc<dyn Provider<Http<Client>> + Send + Sync> = Arc::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if chain_id != config.chain_id {
            anyhow::bail!(
                "Expected chain_id={}, got {chain_id}",
                config.chain_id
            );
        }

        info!(chain_id, "Connected to chain RPC");

        Ok(Self { provider })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider<Http<Client>> + Send + Sync> {
        Arc::clone(&self.provider)
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        self.provider.get_block_number().await.is_ok()
    }
}
