//! Credential Service - Exchange API Credential Lifecycle
//!
//! Derives L2 trading credentials from an owner-key signature.
//! Create-first with derive fallback: a fresh owner gets new
//! credentials, a returning owner recovers the existing set. Cached
//! credentials are only reused when they were derived for the
//! currently connected owner.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, instrument};

use crate::domain::error::SessionError;
use crate::domain::session::ApiCredentials;
use crate::ports::exchange::{ExchangeApi, L1AuthPayload};
use crate::ports::signer::OwnerSigner;

/// Monotonic per-process nonce; uniqueness within a clock second is
/// all the exchange requires.
static AUTH_NONCE: AtomicU64 = AtomicU64::new(0);

/// Obtains and validates exchange credentials for the owner key.
pub struct CredentialService<S: OwnerSigner, E: ExchangeApi> {
  signer: Arc<S>,
  exchange: Arc<E>,
}

impl<S: OwnerSigner, E: ExchangeApi> CredentialService<S, E> {
  pub fn new(signer: Arc<S>, exchange: Arc<E>) -> Self {
    Self { signer, exchange }
  }

  /// Address of the connected owner key.
  pub fn owner(&self) -> alloy::primitives::Address {
    self.signer.address()
  }

  /// Obtain credentials for the connected owner.
  ///
  /// Tries creation first; when the exchange reports the owner
  /// already has a key set, falls back to derivation, which is
  /// deterministic per owner. Both paths authenticate with a fresh
  /// owner-key signature.
  #[instrument(skip(self), fields(owner = %self.signer.address()))]
  pub async fn obtain(&self) -> Result<ApiCredentials, SessionError> {
    let auth = self.build_auth_payload().await?;

    match self.exchange.create_api_key(&auth).await {
      Ok(creds) => {
        info!("Created new exchange credentials");
        Ok(creds)
      }
      Err(create_err) => {
        debug!(error = %create_err, "Creation rejected, deriving existing credentials");
        let auth = self.build_auth_payload().await?;
        self
          .exchange
          .derive_api_key(&auth)
          .await
          .map_err(|derive_err| {
            SessionError::Exchange(format!(
              "credential creation failed ({create_err}); derivation failed ({derive_err})"
            ))
          })
      }
    }
  }

  /// Sign the timestamped attestation message the exchange verifies.
  async fn build_auth_payload(&self) -> Result<L1AuthPayload, SessionError> {
    let address = self.signer.address();
    let timestamp = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map_err(|e| SessionError::Exchange(format!("system clock before epoch: {e}")))?
      .as_secs()
      .to_string();
    let nonce = AUTH_NONCE.fetch_add(1, Ordering::Relaxed);

    let message = format!(
      "This message attests that I control the given wallet\naddress: {}\ntimestamp: {timestamp}\nnonce: {nonce}",
      address.to_checksum(None)
    );

    let signature = self
      .signer
      .sign_message(message.as_bytes())
      .await
      .map_err(|e| SessionError::Exchange(format!("owner signature failed: {e}")))?;

    Ok(L1AuthPayload {
      address,
      timestamp,
      nonce,
      signature,
    })
  }
}
