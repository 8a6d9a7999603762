//! Relayer API Port - Sponsored Transaction Interface
//!
//! The relayer deploys proxy wallets, executes batched transactions
//! through them, and answers status polls by relay transaction id.
//! It pays gas on the user's behalf; the core never signs raw
//! transactions itself.

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One call executed by the proxy wallet inside a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyTransaction {
  /// Call target.
  pub to: Address,
  /// Native value forwarded (normally zero — gasless flows move tokens).
  pub value: U256,
  /// ABI-encoded calldata.
  pub data: Bytes,
}

/// Terminal and non-terminal relay transaction states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayTxStatus {
  /// Accepted by the relayer, not yet mined.
  Pending,
  /// Mined but not yet confirmed.
  Mined,
  /// Confirmed on-chain.
  Confirmed,
  /// Reverted or rejected, with the relayer's reason.
  Failed(String),
}

impl RelayTxStatus {
  /// Whether polling can stop at this state.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Mined | Self::Confirmed | Self::Failed(_))
  }
}

/// Trait for the relayer HTTP surface.
#[async_trait]
pub trait RelayerApi: Send + Sync + 'static {
  /// Indexed lookup: has this proxy been deployed through the relayer?
  ///
  /// May lag the chain; callers fall back to a bytecode check on
  /// failure or a negative answer.
  async fn is_proxy_deployed(&self, proxy: Address) -> anyhow::Result<bool>;

  /// Request a sponsored proxy deployment for an owner.
  ///
  /// Returns the relay transaction id to poll.
  async fn deploy_proxy(&self, owner: Address, factory: Address) -> anyhow::Result<String>;

  /// Execute a batch of calls atomically through a proxy wallet.
  async fn submit_batch(
    &self,
    proxy: Address,
    transactions: &[ProxyTransaction],
  ) -> anyhow::Result<String>;

  /// Poll the status of a relay transaction.
  async fn transaction_status(&self, tx_id: &str) -> anyhow::Result<RelayTxStatus>;
}
