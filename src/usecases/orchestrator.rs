//! Session Orchestrator - Idempotent Owner Onboarding
//!
//! The single entry point that takes any owner from "key connected" to
//! "ready to trade": derive the proxy address, deploy the proxy if
//! missing, obtain exchange credentials, set the exchange approvals.
//! Every step is skipped when its outcome is already established, so
//! re-running for a complete session is a cheap no-op. A per-owner
//! async lock guarantees at most one orchestration in flight per
//! owner; concurrent callers queue and then observe the finished work.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use tracing::{debug, info, instrument};

use crate::domain::address::DerivationScheme;
use crate::domain::error::SessionError;
use crate::domain::session::{Session, SessionStep};
use crate::ports::chain::ChainReader;
use crate::ports::exchange::ExchangeApi;
use crate::ports::relayer::RelayerApi;
use crate::ports::signer::OwnerSigner;
use crate::ports::store::SessionStore;
use crate::usecases::approvals::ApprovalBatcher;
use crate::usecases::credentials::CredentialService;
use crate::usecases::deployment::DeploymentController;

/// Result of one orchestration pass.
#[derive(Debug, Clone)]
pub struct SessionReport {
  /// The session as persisted at the end of the pass.
  pub session: Session,
  /// Steps this pass actually performed, in order. A re-run over a
  /// complete session reports only `Checking` and `Complete`.
  pub steps: Vec<SessionStep>,
}

/// Orchestrates the full onboarding flow over the injected ports.
pub struct SessionOrchestrator<S, E, R, C, St>
where
  S: OwnerSigner,
  E: ExchangeApi,
  R: RelayerApi,
  C: ChainReader,
  St: SessionStore,
{
  scheme: DerivationScheme,
  factory: Address,
  deployment: DeploymentController<R, C>,
  credentials: CredentialService<S, E>,
  approvals: ApprovalBatcher<C, R>,
  store: Arc<St>,
  /// Per-owner in-flight locks. The outer mutex only guards map
  /// access; the long-held lock is the inner per-owner one.
  locks: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S, E, R, C, St> SessionOrchestrator<S, E, R, C, St>
where
  S: OwnerSigner,
  E: ExchangeApi,
  R: RelayerApi,
  C: ChainReader,
  St: SessionStore,
{
  pub fn new(
    scheme: DerivationScheme,
    deployment: DeploymentController<R, C>,
    credentials: CredentialService<S, E>,
    approvals: ApprovalBatcher<C, R>,
    store: Arc<St>,
  ) -> Self {
    let factory = scheme.factory;
    Self {
      scheme,
      factory,
      deployment,
      credentials,
      approvals,
      store,
      locks: Mutex::new(HashMap::new()),
    }
  }

  /// Bring an owner's session to completion, performing only the
  /// steps whose outcome is not already established.
  #[instrument(skip(self), fields(owner = %owner))]
  pub async fn ensure_session(&self, owner: Address) -> Result<SessionReport, SessionError> {
    // Credentials can only be derived with the connected key.
    if owner != self.credentials.owner() {
      return Err(SessionError::NotConnected);
    }

    let lock = self.owner_lock(owner);
    let _guard = lock.lock().await;

    // Re-load under the lock: a queued caller must observe the work
    // the previous holder persisted.
    let mut session = self.load_or_create(owner).await?;
    let mut steps = vec![SessionStep::Checking];

    if session.is_complete() && session.credentials_valid_for(owner) {
      debug!("Session already complete");
      session.touch();
      self.persist(&session).await?;
      steps.push(SessionStep::Complete);
      return Ok(SessionReport { session, steps });
    }

    if !session.is_proxy_deployed {
      if self.deployment.is_deployed(session.proxy_address).await? {
        debug!(proxy = %session.proxy_address, "Proxy already on-chain");
      } else {
        steps.push(SessionStep::Deploying);
        self
          .deployment
          .deploy(owner, self.factory, session.proxy_address)
          .await?;
      }
      session.is_proxy_deployed = true;
      self.persist(&session).await?;
    }

    if !session.credentials_valid_for(owner) {
      steps.push(SessionStep::DerivingCredentials);
      session.clear_credentials();
      let creds = self.credentials.obtain().await?;
      session.bind_credentials(creds);
      self.persist(&session).await?;
    }

    if !session.has_approvals {
      let status = self.approvals.check(session.proxy_address).await;
      if status.all_set() {
        debug!("Approvals already in place");
      } else {
        steps.push(SessionStep::SettingApprovals);
        self.approvals.execute(session.proxy_address).await?;
      }
      session.has_approvals = true;
      self.persist(&session).await?;
    }

    session.touch();
    self.persist(&session).await?;
    steps.push(SessionStep::Complete);
    info!(proxy = %session.proxy_address, "Session complete");

    Ok(SessionReport { session, steps })
  }

  /// Load the persisted session or start a fresh one.
  ///
  /// A schema-version mismatch discards the record entirely; derived
  /// state is always recomputable from chain and exchange.
  async fn load_or_create(&self, owner: Address) -> Result<Session, SessionError> {
    let loaded = self
      .store
      .load(owner)
      .await
      .map_err(|e| SessionError::Store(e.to_string()))?;

    match loaded {
      Some(session) if session.is_current_schema() => Ok(session),
      Some(stale) => {
        info!(
          persisted = stale.schema_version,
          "Discarding session with stale schema"
        );
        self
          .store
          .delete(owner)
          .await
          .map_err(|e| SessionError::Store(e.to_string()))?;
        Ok(Session::new(owner, self.scheme.derive(owner)))
      }
      None => Ok(Session::new(owner, self.scheme.derive(owner))),
    }
  }

  async fn persist(&self, session: &Session) -> Result<(), SessionError> {
    self
      .store
      .save(session)
      .await
      .map_err(|e| SessionError::Store(e.to_string()))
  }

  fn owner_lock(&self, owner: Address) -> Arc<tokio::sync::Mutex<()>> {
    let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
    Arc::clone(locks.entry(owner).or_default())
  }
}
