//! Error taxonomy for the session and trading cores.
//!
//! Two disjoint surfaces: `SessionError` for the orchestration flow
//! (deployment, credentials, approvals) and `TradeError` for single
//! order attempts. Order errors never invalidate a session; session
//! errors return the orchestrator to idle for explicit user re-entry.

use std::time::Duration;

use alloy::primitives::Address;
use thiserror::Error;

/// Errors raised by the session orchestration flow.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed address input to derivation. Never retried.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// No owner key or signer available. User-actionable.
    #[error("no owner key connected")]
    NotConnected,

    /// Deployment polling exceeded its deadline. Retryable by re-invoking.
    #[error("deployment polling timed out after {0:?}")]
    DeploymentTimeout(Duration),

    /// Proxy already deployed. Absorbed as success inside the
    /// deployment controller; surfacing it to a caller is a bug.
    #[error("proxy already deployed")]
    AlreadyDeployed,

    /// Cached credentials belong to a different owner. Handled internally
    /// by discarding and re-deriving; never shown to the user.
    #[error("credentials derived for {cached}, current owner is {current}")]
    CredentialMismatch { cached: Address, current: Address },

    /// Relayer-side failure (deploy, batch submission, status polling).
    #[error("relayer error: {0}")]
    Relayer(String),

    /// Exchange-side failure (credential create/derive).
    #[error("exchange error: {0}")]
    Exchange(String),

    /// Chain read failure (bytecode/balance/allowance fallback path).
    #[error("chain read error: {0}")]
    Chain(String),

    /// Session persistence failure.
    #[error("session store error: {0}")]
    Store(String),
}

/// Errors scoped to a single order attempt.
#[derive(Debug, Error)]
pub enum TradeError {
    /// No usable order book and no fallback price. Blocks submission.
    #[error("no usable liquidity for pricing")]
    InsufficientLiquidity,

    /// Stake below the instrument minimum. Actionable warning, blocked.
    #[error("order below minimum: requires {minimum:.2}, got {got:.2}")]
    BelowMinimumOrder { minimum: f64, got: f64 },

    /// Stake exceeds the known available balance.
    #[error("insufficient balance: available {available:.2}, requested {requested:.2}")]
    InsufficientBalance { available: f64, requested: f64 },

    /// Wallet/signer not ready, classified from provider error text.
    /// Callers should suggest a reconnect rather than a blind retry.
    #[error("signer not ready: {0}")]
    SignerNotReady(String),

    /// Generic exchange-side rejection, surfaced verbatim.
    #[error("order submission failed: {0}")]
    OrderSubmissionFailed(String),

    /// Intent shape violation (e.g. limit order without a price).
    #[error("invalid order intent: {0}")]
    InvalidIntent(String),
}

/// Provider error fragments that mean "reconnect the wallet", not "retry".
const SIGNER_NOT_READY_MARKERS: &[&str] = &[
    "signer not available",
    "signer is not ready",
    "wallet not ready",
    "wallet not connected",
    "not connected",
    "still initializing",
];

/// Classify an exchange/provider failure message into a trade error.
///
/// Known wallet-not-ready substrings collapse into `SignerNotReady`;
/// everything else is a generic `OrderSubmissionFailed` carrying the
/// original message.
pub fn classify_submission_error(message: &str) -> TradeError {
    let lowered = message.to_lowercase();
    if SIGNER_NOT_READY_MARKERS.iter().any(|m| lowered.contains(m)) {
        TradeError::SignerNotReady(message.to_string())
    } else {
        TradeError::OrderSubmissionFailed(message.to_string())
    }
}

/// Relayer failure text that actually means the deploy already happened.
pub fn is_already_deployed_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("already deployed") || lowered.contains("proxy exists")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_signer_not_ready_variants() {
        let e = classify_submission_error("Magic wallet not connected yet");
        assert!(matches!(e, TradeError::SignerNotReady(_)));

        let e = classify_submission_error("signer is NOT READY");
        assert!(matches!(e, TradeError::SignerNotReady(_)));
    }

    #[test]
    fn generic_rejection_passes_through_verbatim() {
        let e = classify_submission_error("order size exceeds market cap");
        match e {
            TradeError::OrderSubmissionFailed(msg) => {
                assert_eq!(msg, "order size exceeds market cap");
            }
            other => panic!("expected OrderSubmissionFailed, got {other:?}"),
        }
    }

    #[test]
    fn already_deployed_detection() {
        assert!(is_already_deployed_message("Error: Proxy ALREADY DEPLOYED"));
        assert!(is_already_deployed_message("proxy exists at address"));
        assert!(!is_already_deployed_message("deployment reverted"));
    }
}
