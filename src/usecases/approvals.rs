//! Approval Batcher - Exchange Operator Approvals
//!
//! The exchange contracts can only move funds the proxy wallet has
//! approved. Six approvals are required: the collateral ERC-20 and the
//! conditional-token ERC-1155, each toward the CTF exchange, the
//! neg-risk exchange, and the neg-risk adapter. Checks run
//! concurrently; execution always submits the full batch because the
//! relayer call is atomic and re-approving is idempotent on-chain.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use futures_util::future::join_all;
use tracing::{info, instrument, warn};

use crate::adapters::chain::calldata;
use crate::config::ContractsConfig;
use crate::domain::address::parse_address;
use crate::domain::error::SessionError;
use crate::ports::chain::ChainReader;
use crate::ports::relayer::{ProxyTransaction, RelayTxStatus, RelayerApi};
use crate::usecases::deployment::{PollPolicy, poll_to_terminal};

/// Allowance below this is treated as unset. New approvals grant
/// `U256::MAX`, so anything under a million collateral units means a
/// partial legacy grant that should be refreshed.
fn min_collateral_allowance() -> U256 {
  // 1_000_000 units at 6 decimals.
  U256::from(1_000_000u64) * U256::from(1_000_000u64)
}

/// The token contracts and exchange operators involved in approvals.
#[derive(Debug, Clone)]
pub struct ApprovalTargets {
  pub collateral: Address,
  pub conditional_tokens: Address,
  /// CTF exchange, neg-risk exchange, neg-risk adapter.
  pub operators: [Address; 3],
}

impl ApprovalTargets {
  /// Parse the configured contract addresses.
  pub fn from_config(contracts: &ContractsConfig) -> Result<Self, SessionError> {
    Ok(Self {
      collateral: parse_address(&contracts.collateral)?,
      conditional_tokens: parse_address(&contracts.conditional_tokens)?,
      operators: [
        parse_address(&contracts.ctf_exchange)?,
        parse_address(&contracts.neg_risk_exchange)?,
        parse_address(&contracts.neg_risk_adapter)?,
      ],
    })
  }
}

/// Current approval state of a proxy wallet, one flag per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalStatus {
  /// Collateral allowance per operator, in `operators` order.
  pub collateral: [bool; 3],
  /// Conditional-token operator approval per operator, same order.
  pub conditional: [bool; 3],
}

impl ApprovalStatus {
  /// Whether every required approval is in place.
  pub fn all_set(&self) -> bool {
    self.collateral.iter().all(|&b| b) && self.conditional.iter().all(|&b| b)
  }
}

/// Checks and sets the six exchange approvals through the relayer.
pub struct ApprovalBatcher<C: ChainReader, R: RelayerApi> {
  chain: Arc<C>,
  relayer: Arc<R>,
  targets: ApprovalTargets,
  policy: PollPolicy,
}

impl<C: ChainReader, R: RelayerApi> ApprovalBatcher<C, R> {
  pub fn new(chain: Arc<C>, relayer: Arc<R>, targets: ApprovalTargets, policy: PollPolicy) -> Self {
    Self {
      chain,
      relayer,
      targets,
      policy,
    }
  }

  /// Check all six approvals concurrently.
  ///
  /// A failed read degrades to "not approved" rather than aborting:
  /// the worst consequence is a redundant, idempotent re-approval.
  #[instrument(skip(self), fields(proxy = %proxy))]
  pub async fn check(&self, proxy: Address) -> ApprovalStatus {
    let threshold = min_collateral_allowance();

    let allowances = join_all(self.targets.operators.iter().map(|operator| {
      self
        .chain
        .erc20_allowance(self.targets.collateral, proxy, *operator)
    }));
    let operators = join_all(self.targets.operators.iter().map(|operator| {
      self
        .chain
        .is_approved_for_all(self.targets.conditional_tokens, proxy, *operator)
    }));
    let (allowances, operators) = tokio::join!(allowances, operators);

    let mut status = ApprovalStatus {
      collateral: [false; 3],
      conditional: [false; 3],
    };
    for (i, result) in allowances.into_iter().enumerate() {
      status.collateral[i] = match result {
        Ok(v) => v >= threshold,
        Err(e) => {
          warn!(error = %e, "Allowance read failed, treating as unset");
          false
        }
      };
    }
    for (i, result) in operators.into_iter().enumerate() {
      status.conditional[i] = match result {
        Ok(v) => v,
        Err(e) => {
          warn!(error = %e, "Operator approval read failed, treating as unset");
          false
        }
      };
    }

    status
  }

  /// Submit the approval batch and wait for a terminal relay state.
  #[instrument(skip(self), fields(proxy = %proxy))]
  pub async fn execute(&self, proxy: Address) -> Result<(), SessionError> {
    let batch = build_approval_batch(&self.targets);
    let tx_id = self
      .relayer
      .submit_batch(proxy, &batch)
      .await
      .map_err(|e| SessionError::Relayer(e.to_string()))?;

    match poll_to_terminal(self.relayer.as_ref(), &tx_id, self.policy).await? {
      RelayTxStatus::Mined | RelayTxStatus::Confirmed => {
        info!(tx_id = %tx_id, "Approval batch executed");
        Ok(())
      }
      RelayTxStatus::Failed(reason) => Err(SessionError::Relayer(reason)),
      RelayTxStatus::Pending => unreachable!("poll_to_terminal never returns Pending"),
    }
  }
}

/// Build the full six-call approval batch.
///
/// Always all six, regardless of current state: the batch executes
/// atomically and repeating an approval is a cheap no-op on-chain,
/// while a partial batch risks leaving the proxy half-approved if the
/// check raced a concurrent grant.
pub fn build_approval_batch(targets: &ApprovalTargets) -> Vec<ProxyTransaction> {
  let mut batch = Vec::with_capacity(6);

  for operator in targets.operators {
    batch.push(ProxyTransaction {
      to: targets.collateral,
      value: U256::ZERO,
      data: calldata::erc20_approve(operator, U256::MAX),
    });
  }
  for operator in targets.operators {
    batch.push(ProxyTransaction {
      to: targets.conditional_tokens,
      value: U256::ZERO,
      data: calldata::set_approval_for_all(operator, true),
    });
  }

  batch
}
