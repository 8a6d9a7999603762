//! Deployment Controller - Proxy Wallet Deployment Lifecycle
//!
//! Checks whether a proxy wallet exists and deploys it through the
//! relayer when it doesn't. Deployment status is polled at a fixed
//! interval up to a hard deadline; "already deployed" relayer failures
//! are absorbed as success because two concurrent deploy attempts are
//! a known race, not an error.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument, warn};

use crate::domain::error::{SessionError, is_already_deployed_message};
use crate::ports::chain::ChainReader;
use crate::ports::relayer::{RelayTxStatus, RelayerApi};

/// Polling parameters, injected from config so tests run near-zero.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
  /// Interval between status polls.
  pub interval: Duration,
  /// Hard deadline before reporting `DeploymentTimeout`.
  pub timeout: Duration,
}

impl PollPolicy {
  /// Build from config milliseconds.
  pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Self {
    Self {
      interval: Duration::from_millis(interval_ms),
      timeout: Duration::from_millis(timeout_ms),
    }
  }
}

/// Drives proxy deployment through the relayer with chain fallback.
pub struct DeploymentController<R: RelayerApi, C: ChainReader> {
  relayer: Arc<R>,
  chain: Arc<C>,
  policy: PollPolicy,
}

impl<R: RelayerApi, C: ChainReader> DeploymentController<R, C> {
  /// Create a controller with the given polling policy.
  pub fn new(relayer: Arc<R>, chain: Arc<C>, policy: PollPolicy) -> Self {
    Self {
      relayer,
      chain,
      policy,
    }
  }

  /// Whether the proxy has been deployed.
  ///
  /// Prefers the relayer's indexed lookup; a failure or a negative
  /// answer falls through to the bytecode check, which is
  /// authoritative (non-empty code cannot regress). Both paths agree
  /// on semantics: empty/absent code = not deployed.
  #[instrument(skip(self), fields(proxy = %proxy))]
  pub async fn is_deployed(&self, proxy: Address) -> Result<bool, SessionError> {
    match self.relayer.is_proxy_deployed(proxy).await {
      Ok(true) => return Ok(true),
      Ok(false) => debug!("Indexed lookup negative, verifying on-chain"),
      Err(e) => warn!(error = %e, "Indexed lookup failed, falling back to chain"),
    }

    self
      .chain
      .has_code(proxy)
      .await
      .map_err(|e| SessionError::Chain(e.to_string()))
  }

  /// Deploy the owner's proxy and wait for a terminal relay state.
  ///
  /// Returns the predicted address on success. An "already deployed"
  /// failure, whether at submission or in the terminal status, resolves
  /// to the same predicted address without surfacing an error.
  #[instrument(skip(self), fields(owner = %owner))]
  pub async fn deploy(
    &self,
    owner: Address,
    factory: Address,
    predicted: Address,
  ) -> Result<Address, SessionError> {
    let tx_id = match self.relayer.deploy_proxy(owner, factory).await {
      Ok(id) => id,
      Err(e) if is_already_deployed_message(&e.to_string()) => {
        info!(proxy = %predicted, "Deploy raced: proxy already deployed");
        return Ok(predicted);
      }
      Err(e) => return Err(SessionError::Relayer(e.to_string())),
    };

    match self.await_terminal(&tx_id).await? {
      RelayTxStatus::Mined | RelayTxStatus::Confirmed => {
        info!(proxy = %predicted, tx_id = %tx_id, "Proxy deployed");
        Ok(predicted)
      }
      RelayTxStatus::Failed(reason) if is_already_deployed_message(&reason) => {
        info!(proxy = %predicted, "Deploy raced: proxy already deployed");
        Ok(predicted)
      }
      RelayTxStatus::Failed(reason) => Err(SessionError::Relayer(reason)),
      RelayTxStatus::Pending => unreachable!("await_terminal never returns Pending"),
    }
  }

  /// Poll a relay transaction to a terminal state within the deadline.
  pub async fn await_terminal(&self, tx_id: &str) -> Result<RelayTxStatus, SessionError> {
    poll_to_terminal(self.relayer.as_ref(), tx_id, self.policy).await
  }
}

/// Poll a relay transaction until it reaches a terminal state.
///
/// Shared by deployment, the approval batch, and recovery transfers.
/// Transient poll failures count against the deadline only.
pub async fn poll_to_terminal<R: RelayerApi>(
  relayer: &R,
  tx_id: &str,
  policy: PollPolicy,
) -> Result<RelayTxStatus, SessionError> {
  let deadline = Instant::now() + policy.timeout;

  loop {
    match relayer.transaction_status(tx_id).await {
      Ok(status) if status.is_terminal() => return Ok(status),
      Ok(_) => debug!(tx_id, "Relay transaction still pending"),
      Err(e) => warn!(tx_id, error = %e, "Status poll failed"),
    }

    if Instant::now() + policy.interval > deadline {
      warn!(tx_id, timeout = ?policy.timeout, "Polling deadline exceeded");
      return Err(SessionError::DeploymentTimeout(policy.timeout));
    }

    sleep(policy.interval).await;
  }
}
