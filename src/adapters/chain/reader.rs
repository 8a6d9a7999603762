//! Chain Reader Adapter - Fallback On-chain Reads via alloy
//!
//! Implements the `ChainReader` port with raw `eth_call`s against the
//! shared provider. Used when the indexed APIs fail and for the
//! approval/balance checks.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::rpc::types::TransactionRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::instrument;

use crate::ports::chain::ChainReader;

use super::calldata;
use super::provider::RpcProvider;

/// On-chain reader backed by the shared RPC provider.
pub struct AlloyChainReader {
    provider: Arc<RpcProvider>,
}

impl AlloyChainReader {
    /// Create a reader over the shared provider.
    pub fn new(provider: Arc<RpcProvider>) -> Self {
        Self { provider }
    }

    /// Execute a read-only call and return the raw return data.
    async fn call(&self, to: Address, data: alloy::primitives::Bytes) -> Result<Vec<u8>> {
        let tx = TransactionRequest::default().to(to).input(data.into());

        let result = self
            .provider
            .inner()
            .call(&tx)
            .await
            .context("eth_call failed")?;

        Ok(result.to_vec())
    }
}

#[async_trait]
impl ChainReader for AlloyChainReader {
    #[instrument(skip(self), fields(address = %address))]
    async fn has_code(&self, address: Address) -> Result<bool> {
        let code = self
            .provider
            .inner()
            .get_code_at(address)
            .await
            .context("Failed to query code at address")?;

        Ok(!code.is_empty())
    }

    async fn erc20_balance(&self, token: Address, holder: Address) -> Result<U256> {
        let result = self
            .call(token, calldata::erc20_balance_of(holder))
            .await
            .context("balanceOf call failed")?;

        Ok(U256::from_be_slice(&result))
    }

    async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256> {
        let result = self
            .call(token, calldata::erc20_allowance(owner, spender))
            .await
            .context("allowance call failed")?;

        Ok(U256::from_be_slice(&result))
    }

    async fn is_approved_for_all(
        &self,
        token: Address,
        owner: Address,
        operator: Address,
    ) -> Result<bool> {
        let result = self
            .call(token, calldata::is_approved_for_all(owner, operator))
            .await
            .context("isApprovedForAll call failed")?;

        // ABI bool: last byte of the 32-byte word
        Ok(result.last().copied() == Some(1))
    }
}
