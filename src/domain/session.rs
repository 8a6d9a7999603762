//! Session record — one per owner key.
//!
//! Tracks everything the orchestrator has established for an owner:
//! the predicted/confirmed proxy address, deployment state, trading
//! credentials, and approval status. Serialized as-is by the session
//! store; a `schema_version` bump invalidates persisted records
//! wholesale.

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current persisted-session schema. Bumping forces a full reset of
/// all derived state on next load.
pub const SESSION_SCHEMA_VERSION: u32 = 3;

/// Trading credentials issued by the exchange, bound to one owner key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiCredentials {
    /// API key identifier.
    pub key: String,
    /// HMAC secret (base64). Never logged.
    pub secret: String,
    /// Passphrase sent alongside signed requests.
    pub passphrase: String,
}

/// Orchestrator steps, in the order a fresh session visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStep {
    Checking,
    Deploying,
    DerivingCredentials,
    SettingApprovals,
    Complete,
}

impl std::fmt::Display for SessionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Checking => "checking",
            Self::Deploying => "deploying",
            Self::DerivingCredentials => "deriving_credentials",
            Self::SettingApprovals => "setting_approvals",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Per-owner session state, persisted after every completed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The owner key this session belongs to. Store key; never shared.
    pub owner_address: Address,
    /// Predicted (pre-deploy) or confirmed proxy wallet address.
    pub proxy_address: Address,
    /// Whether the proxy has deployed bytecode on-chain.
    pub is_proxy_deployed: bool,
    /// Whether credentials exist and are bound to this owner.
    pub has_credentials: bool,
    /// Whether the full approval set is confirmed on-chain.
    pub has_approvals: bool,
    /// Trading credentials, present once derived.
    pub credentials: Option<ApiCredentials>,
    /// Owner the credentials were derived for. Must equal
    /// `owner_address`; a mismatch forces re-derivation.
    pub credentials_derived_for: Option<Address>,
    /// Persisted schema version.
    pub schema_version: u32,
    /// Last time the orchestrator touched this session.
    pub last_checked_at: DateTime<Utc>,
}

impl Session {
    /// Fresh session for an owner with a predicted proxy address.
    pub fn new(owner_address: Address, proxy_address: Address) -> Self {
        Self {
            owner_address,
            proxy_address,
            is_proxy_deployed: false,
            has_credentials: false,
            has_approvals: false,
            credentials: None,
            credentials_derived_for: None,
            schema_version: SESSION_SCHEMA_VERSION,
            last_checked_at: Utc::now(),
        }
    }

    /// A persisted session is usable only on the current schema.
    pub fn is_current_schema(&self) -> bool {
        self.schema_version == SESSION_SCHEMA_VERSION
    }

    /// All orchestrator steps done.
    pub fn is_complete(&self) -> bool {
        self.is_proxy_deployed && self.has_credentials && self.has_approvals
    }

    /// Credentials exist and were derived for the given owner.
    ///
    /// Cross-owner credential reuse is never trusted.
    pub fn credentials_valid_for(&self, owner: Address) -> bool {
        self.credentials.is_some() && self.credentials_derived_for == Some(owner)
    }

    /// Drop credentials (owner mismatch or forced re-derivation).
    pub fn clear_credentials(&mut self) {
        self.credentials = None;
        self.credentials_derived_for = None;
        self.has_credentials = false;
    }

    /// Bind freshly derived credentials to this session's owner.
    pub fn bind_credentials(&mut self, credentials: ApiCredentials) {
        self.credentials = Some(credentials);
        self.credentials_derived_for = Some(self.owner_address);
        self.has_credentials = true;
    }

    /// Update the last-checked timestamp.
    pub fn touch(&mut self) {
        self.last_checked_at = Utc::now();
    }
}
