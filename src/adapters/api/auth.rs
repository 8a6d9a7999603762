//! CLOB Authentication — HMAC-SHA256 Request Signing
//!
//! Signs CLOB API requests using HMAC-SHA256 over
//! `timestamp + method + path + body`. Credentials are the per-session
//! trading credentials derived by the orchestrator; the secret never
//! appears in a header, only the computed signature.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::Engine;

use crate::domain::session::ApiCredentials;

/// Thread-safe nonce generator: timestamp_seed + atomic counter.
///
/// Guarantees unique nonces even for concurrent requests within
/// the same millisecond.
static NONCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Authentication headers attached to a signed exchange request.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AuthHeaders {
    /// API key identifier.
    pub key: String,
    /// Base64 HMAC-SHA256 signature.
    pub signature: String,
    /// Unix timestamp (seconds) the signature covers.
    pub timestamp: String,
    /// Credential passphrase.
    pub passphrase: String,
}

/// Produces authentication headers for an exchange request.
///
/// Two implementations: `HmacRequestSigner` (credentials held in the
/// session) and `RemoteRequestSigner` (secret held by a remote
/// signing endpoint, consumed as a pure request/response dependency).
#[async_trait]
pub trait RequestSigner: Send + Sync + 'static {
    /// Build the auth headers for `{method, path, body}`.
    async fn auth_headers(
        &self,
        method: &str,
        path: &str,
        body: &str,
    ) -> anyhow::Result<AuthHeaders>;
}

/// Local HMAC-SHA256 signer keyed by session credentials.
pub struct HmacRequestSigner {
    credentials: ApiCredentials,
    /// Timestamp seed set at construction for nonce generation.
    nonce_seed: u64,
}

impl HmacRequestSigner {
    /// Create a signer from derived session credentials.
    pub fn new(credentials: ApiCredentials) -> Self {
        let nonce_seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        Self {
            credentials,
            nonce_seed,
        }
    }

    /// Current Unix timestamp in seconds, as the API expects it.
    pub fn timestamp() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string()
    }

    /// Generate a unique nonce using timestamp_seed + atomic increment.
    pub fn generate_nonce(&self) -> u64 {
        let counter = NONCE_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.nonce_seed + counter
    }

    /// Sign a request: HMAC-SHA256(secret, timestamp + method + path + body).
    ///
    /// The secret is NEVER sent as a header — only the computed signature.
    pub fn sign(&self, timestamp: &str, method: &str, path: &str, body: &str) -> String {
        let message = format!("{timestamp}{method}{path}{body}");
        let mac = hmac_sha256::HMAC::mac(
            message.as_bytes(),
            self.credentials.secret.as_bytes(),
        );
        base64::engine::general_purpose::STANDARD.encode(mac)
    }
}

#[async_trait]
impl RequestSigner for HmacRequestSigner {
    async fn auth_headers(
        &self,
        method: &str,
        path: &str,
        body: &str,
    ) -> anyhow::Result<AuthHeaders> {
        let timestamp = Self::timestamp();
        let signature = self.sign(&timestamp, method, path, body);

        Ok(AuthHeaders {
            key: self.credentials.key.clone(),
            signature,
            timestamp,
            passphrase: self.credentials.passphrase.clone(),
        })
    }
}
