//! Owner Signer Port - Key/Signing Provider Interface
//!
//! The externally-held owner key (EOA). Exposes the owner address and
//! message signing for credential derivation. Deliberately has no
//! dependency on the proxy wallet: credential derivation must work
//! before the proxy exists on-chain.

use alloy::primitives::Address;
use async_trait::async_trait;

/// Trait for the owner key provider.
#[async_trait]
pub trait OwnerSigner: Send + Sync + 'static {
  /// The owner (EOA) address authorizing this session.
  fn address(&self) -> Address;

  /// Sign an arbitrary message with the owner key.
  ///
  /// Returns the signature as 0x-prefixed hex.
  async fn sign_message(&self, message: &[u8]) -> anyhow::Result<String>;
}
