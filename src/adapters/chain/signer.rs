//! Local Owner Signer - alloy Private Key Wrapper
//!
//! Implements the `OwnerSigner` port over an in-process private key.
//! Production deployments with embedded wallets swap in their own
//! provider; this adapter exists for the bootstrap binary and tests.

use alloy::primitives::Address;
use alloy::signers::Signer;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ports::signer::OwnerSigner;

/// Owner signer backed by a local private key.
pub struct LocalOwnerSigner {
    inner: PrivateKeySigner,
}

impl LocalOwnerSigner {
    /// Load the key from the `OWNER_PRIVATE_KEY` env var.
    ///
    /// The key MUST come from `.env` (never committed to git).
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("OWNER_PRIVATE_KEY")
            .context("OWNER_PRIVATE_KEY not set")?;

        let inner: PrivateKeySigner = raw
            .trim()
            .parse()
            .context("Invalid OWNER_PRIVATE_KEY")?;

        Ok(Self { inner })
    }

    /// Wrap an existing key (tests).
    pub fn new(inner: PrivateKeySigner) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl OwnerSigner for LocalOwnerSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String> {
        let signature = self
            .inner
            .sign_message(message)
            .await
            .context("Message signing failed")?;

        Ok(alloy::hex::encode_prefixed(signature.as_bytes()))
    }
}
