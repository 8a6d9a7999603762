//! Legacy Wallet Recovery - Funds Stranded in Old-Scheme Proxies
//!
//! An earlier proxy factory derived different addresses for the same
//! owners, so collateral sent to those wallets is invisible to the
//! current scheme. Recovery derives the legacy address, and when it
//! holds a balance, deploys the legacy proxy if needed and sweeps the
//! full balance into the owner's current proxy through the relayer.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tracing::{info, instrument, warn};

use crate::adapters::chain::calldata;
use crate::domain::address::DerivationScheme;
use crate::domain::error::{SessionError, is_already_deployed_message};
use crate::ports::chain::ChainReader;
use crate::ports::relayer::{ProxyTransaction, RelayTxStatus, RelayerApi};
use crate::usecases::deployment::{PollPolicy, poll_to_terminal};

/// Outcome of one recovery attempt.
#[derive(Debug, Clone)]
pub struct RecoveryReport {
  /// Legacy proxy address derived for the owner.
  pub legacy_proxy: Address,
  /// Collateral balance found there, in atomic units.
  pub balance: U256,
  /// Whether a sweep transfer was executed.
  pub swept: bool,
  /// Relay transaction id of the sweep, when one was submitted.
  pub sweep_tx_id: Option<String>,
}

/// Sweeps stranded collateral out of legacy-scheme proxy wallets.
pub struct LegacyWalletRecovery<C: ChainReader, R: RelayerApi> {
  chain: Arc<C>,
  relayer: Arc<R>,
  legacy_scheme: DerivationScheme,
  collateral: Address,
  policy: PollPolicy,
}

impl<C: ChainReader, R: RelayerApi> LegacyWalletRecovery<C, R> {
  pub fn new(
    chain: Arc<C>,
    relayer: Arc<R>,
    legacy_scheme: DerivationScheme,
    collateral: Address,
    policy: PollPolicy,
  ) -> Self {
    Self {
      chain,
      relayer,
      legacy_scheme,
      collateral,
      policy,
    }
  }

  /// Legacy proxy address the old factory would have given this owner.
  pub fn legacy_address(&self, owner: Address) -> Address {
    self.legacy_scheme.derive(owner)
  }

  /// Check the legacy proxy and sweep its balance to `destination`.
  ///
  /// A zero balance short-circuits without touching chain state. The
  /// legacy proxy is deployed on demand: transfers can only be
  /// executed by the wallet itself.
  #[instrument(skip(self), fields(owner = %owner, destination = %destination))]
  pub async fn recover(
    &self,
    owner: Address,
    destination: Address,
  ) -> Result<RecoveryReport, SessionError> {
    let legacy = self.legacy_address(owner);

    let balance = self
      .chain
      .erc20_balance(self.collateral, legacy)
      .await
      .map_err(|e| SessionError::Chain(e.to_string()))?;

    if balance.is_zero() {
      return Ok(RecoveryReport {
        legacy_proxy: legacy,
        balance,
        swept: false,
        sweep_tx_id: None,
      });
    }

    info!(legacy = %legacy, balance = %balance, "Found stranded legacy balance");

    let deployed = self
      .chain
      .has_code(legacy)
      .await
      .map_err(|e| SessionError::Chain(e.to_string()))?;
    if !deployed {
      self.deploy_legacy(owner, legacy).await?;
    }

    let sweep = ProxyTransaction {
      to: self.collateral,
      value: U256::ZERO,
      data: calldata::erc20_transfer(destination, balance),
    };
    let tx_id = self
      .relayer
      .submit_batch(legacy, std::slice::from_ref(&sweep))
      .await
      .map_err(|e| SessionError::Relayer(e.to_string()))?;

    match poll_to_terminal(self.relayer.as_ref(), &tx_id, self.policy).await? {
      RelayTxStatus::Mined | RelayTxStatus::Confirmed => {
        info!(tx_id = %tx_id, "Legacy balance swept");
        Ok(RecoveryReport {
          legacy_proxy: legacy,
          balance,
          swept: true,
          sweep_tx_id: Some(tx_id),
        })
      }
      RelayTxStatus::Failed(reason) => Err(SessionError::Relayer(reason)),
      RelayTxStatus::Pending => unreachable!("poll_to_terminal never returns Pending"),
    }
  }

  async fn deploy_legacy(&self, owner: Address, legacy: Address) -> Result<(), SessionError> {
    let tx_id = match self.relayer.deploy_proxy(owner, self.legacy_scheme.factory).await {
      Ok(id) => id,
      Err(e) if is_already_deployed_message(&e.to_string()) => {
        warn!(legacy = %legacy, "Legacy proxy reported deployed despite empty code");
        return Ok(());
      }
      Err(e) => return Err(SessionError::Relayer(e.to_string())),
    };

    match poll_to_terminal(self.relayer.as_ref(), &tx_id, self.policy).await? {
      RelayTxStatus::Mined | RelayTxStatus::Confirmed => {
        info!(legacy = %legacy, "Legacy proxy deployed for recovery");
        Ok(())
      }
      RelayTxStatus::Failed(reason) if is_already_deployed_message(&reason) => Ok(()),
      RelayTxStatus::Failed(reason) => Err(SessionError::Relayer(reason)),
      RelayTxStatus::Pending => unreachable!("poll_to_terminal never returns Pending"),
    }
  }
}
