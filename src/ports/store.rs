//! Session Store Port - Durable Keyed Persistence
//!
//! One Session record per owner address. The store itself is a dumb
//! load/save pair; read-modify-write discipline is enforced by the
//! orchestrator, which only mutates inside its per-owner lock after
//! re-loading the persisted value.

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::domain::session::Session;

/// Trait for session persistence providers.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
  /// Load the persisted session for an owner, if any.
  async fn load(&self, owner: Address) -> anyhow::Result<Option<Session>>;

  /// Persist a session, keyed by its owner address.
  async fn save(&self, session: &Session) -> anyhow::Result<()>;

  /// Remove an owner's session (schema invalidation).
  async fn delete(&self, owner: Address) -> anyhow::Result<()>;
}
