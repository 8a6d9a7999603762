//! Polymarket Proxy Trader — Entry Point
//!
//! Brings the connected owner key to a trade-ready session, then keeps
//! watched order books warm until SIGINT. Runs entirely gasless: the
//! relayer sponsors deployment and every on-chain write.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Load owner key from env (OWNER_PRIVATE_KEY)
//! 4. Connect RPC provider + chain reader
//! 5. Create relayer and exchange HTTP clients
//! 6. Open the file-backed session store
//! 7. Run the session orchestrator (deploy → credentials → approvals)
//! 8. Install the HMAC request signer with the derived credentials
//! 9. Sweep any legacy-scheme balance into the current proxy
//! 10. Spawn the order book refresh loop for watched tokens
//! 11. Wait for SIGINT → graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::api::auth::HmacRequestSigner;
use adapters::api::client::{ExchangeClient, ExchangeClientConfig};
use adapters::api::exchange::ClobExchange;
use adapters::api::remote::RemoteRequestSigner;
use adapters::chain::provider::RpcProvider;
use adapters::chain::reader::AlloyChainReader;
use adapters::chain::signer::LocalOwnerSigner;
use adapters::persistence::FileSessionStore;
use adapters::relayer::HttpRelayer;
use domain::address::{DerivationScheme, parse_address};
use ports::signer::OwnerSigner;
use usecases::approvals::{ApprovalBatcher, ApprovalTargets};
use usecases::credentials::CredentialService;
use usecases::deployment::{DeploymentController, PollPolicy};
use usecases::orchestrator::SessionOrchestrator;
use usecases::pricer::{OrderBookPricer, PricingPolicy};
use usecases::recovery::LegacyWalletRecovery;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.app.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        dry_run = config.app.dry_run,
        "Starting Polymarket Proxy Trader"
    );

    // ── 3. Load owner key from env ──────────────────────────
    let signer = Arc::new(
        LocalOwnerSigner::from_env().context("Failed to load owner key from env")?,
    );
    let owner = signer.address();
    info!(owner = %owner, "Owner key loaded");

    // ── 4. Connect RPC provider + chain reader ──────────────
    let provider = Arc::new(
        RpcProvider::connect(&config.api)
            .await
            .context("Failed to connect RPC provider")?,
    );
    let chain = Arc::new(AlloyChainReader::new(Arc::clone(&provider)));

    // ── 5. Create relayer and exchange clients ──────────────
    let timeout = Duration::from_millis(config.api.timeout_ms);
    let relayer = Arc::new(
        HttpRelayer::new(config.api.relayer_url.clone(), timeout)
            .context("Failed to create relayer client")?,
    );

    let exchange_client = Arc::new(
        ExchangeClient::new(ExchangeClientConfig {
            base_url: config.api.exchange_url.clone(),
            timeout,
            ..ExchangeClientConfig::default()
        })
        .context("Failed to create exchange client")?,
    );
    let exchange = Arc::new(ClobExchange::new(Arc::clone(&exchange_client)));

    // Startup health probes. Unreachable endpoints are logged, not
    // fatal: every call path retries on its own.
    if !provider.is_healthy().await {
        warn!("Chain RPC health probe failed");
    }
    if !exchange_client.health_check().await {
        warn!("Exchange API health probe failed");
    }

    // ── 6. Open the session store ───────────────────────────
    let store = Arc::new(
        FileSessionStore::new(&config.persistence.data_dir)
            .await
            .context("Failed to open session store")?,
    );

    // ── 7. Run the session orchestrator ─────────────────────
    let scheme = DerivationScheme {
        factory: parse_address(&config.contracts.proxy_factory)?,
        init_code_hash: config
            .contracts
            .proxy_init_code_hash
            .parse()
            .context("Invalid proxy init code hash")?,
    };
    let policy = PollPolicy::from_millis(
        config.deployment.poll_interval_ms,
        config.deployment.timeout_ms,
    );
    let targets = ApprovalTargets::from_config(&config.contracts)?;

    let orchestrator = SessionOrchestrator::new(
        scheme,
        DeploymentController::new(Arc::clone(&relayer), Arc::clone(&chain), policy),
        CredentialService::new(Arc::clone(&signer), Arc::clone(&exchange)),
        ApprovalBatcher::new(Arc::clone(&chain), Arc::clone(&relayer), targets, policy),
        Arc::clone(&store),
    );

    let report = orchestrator
        .ensure_session(owner)
        .await
        .context("Session orchestration failed")?;
    info!(
        proxy = %report.session.proxy_address,
        steps = report.steps.len(),
        "Session ready"
    );

    // ── 8. Install the request signer ───────────────────────
    // Remote signing keeps the API secret out of this process; the
    // local HMAC signer uses the credentials derived above.
    if let Some(signing_url) = config.api.signing_url.clone() {
        let remote = RemoteRequestSigner::new(signing_url, timeout)
            .context("Failed to create remote signer")?;
        exchange_client.install_signer(Arc::new(remote)).await;
    } else if let Some(creds) = report.session.credentials.clone() {
        exchange_client
            .install_signer(Arc::new(HmacRequestSigner::new(creds)))
            .await;
    }
    if !exchange_client.has_signer().await {
        warn!("No request signer installed; authenticated endpoints will fail");
    }

    // ── 9. Sweep any legacy-scheme balance ──────────────────
    let legacy_scheme = DerivationScheme {
        factory: parse_address(&config.contracts.legacy_proxy_factory)?,
        init_code_hash: config
            .contracts
            .legacy_init_code_hash
            .parse()
            .context("Invalid legacy init code hash")?,
    };
    let recovery = LegacyWalletRecovery::new(
        Arc::clone(&chain),
        Arc::clone(&relayer),
        legacy_scheme,
        parse_address(&config.contracts.collateral)?,
        policy,
    );
    match recovery.recover(owner, report.session.proxy_address).await {
        Ok(r) if r.swept => info!(
            legacy = %r.legacy_proxy,
            balance = %r.balance,
            "Legacy balance recovered"
        ),
        Ok(_) => info!("No legacy balance to recover"),
        // Recovery is best-effort; a failure never blocks trading.
        Err(e) => warn!(error = %e, "Legacy recovery failed"),
    }

    // ── 10. Spawn the order book refresh loop ───────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let pricer = Arc::new(OrderBookPricer::new(
        Arc::clone(&exchange),
        PricingPolicy::from_config(&config.trading),
    ));

    let refresh_handle = if config.trading.watch_tokens.is_empty() {
        warn!("No watched tokens configured; books fetched on demand only");
        None
    } else {
        Some(pricer.spawn_refresh(
            config.trading.watch_tokens.clone(),
            shutdown_tx.subscribe(),
        ))
    };

    info!("Ready — trading session live");

    // ── 11. Wait for SIGINT ─────────────────────────────────
    signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("SIGINT received, shutting down");

    let _ = shutdown_tx.send(());
    if let Some(handle) = refresh_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}
