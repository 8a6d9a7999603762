//! Chain Reader Port - Fallback On-chain Reads
//!
//! Bytecode, balance and allowance lookups used when the indexed APIs
//! are unavailable, plus the approval checks. Read-only; all writes go
//! through the relayer.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

/// Trait for read-only chain access via alloy-rs.
#[async_trait]
pub trait ChainReader: Send + Sync + 'static {
  /// Whether non-empty bytecode exists at an address.
  ///
  /// Empty/absent code means "not deployed"; this read is
  /// authoritative when it disagrees with an indexed lookup.
  async fn has_code(&self, address: Address) -> anyhow::Result<bool>;

  /// ERC-20 balance of a holder.
  async fn erc20_balance(&self, token: Address, holder: Address) -> anyhow::Result<U256>;

  /// ERC-20 allowance granted by `owner` to `spender`.
  async fn erc20_allowance(
    &self,
    token: Address,
    owner: Address,
    spender: Address,
  ) -> anyhow::Result<U256>;

  /// ERC-1155 operator approval from `owner` to `operator`.
  async fn is_approved_for_all(
    &self,
    token: Address,
    owner: Address,
    operator: Address,
  ) -> anyhow::Result<bool>;
}
