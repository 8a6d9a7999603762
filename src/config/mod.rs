//! Configuration Module - TOML-based Configuration
//!
//! Loads and validates configuration from `config.toml`. Secrets
//! (the owner key) come from environment variables, never from the
//! config file. All contract addresses, endpoints, and timing
//! parameters are externalized here - nothing is hardcoded in the
//! domain layer.

pub mod loader;

use serde::Deserialize;

/// Top-level application configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any adapter is constructed.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Application identity and mode.
  pub app: AppSection,
  /// Exchange / relayer / RPC endpoints.
  pub api: ApiConfig,
  /// Contract addresses and derivation schemes.
  pub contracts: ContractsConfig,
  /// Deployment polling parameters.
  #[serde(default)]
  pub deployment: DeploymentConfig,
  /// Pricing and order execution parameters.
  #[serde(default)]
  pub trading: TradingConfig,
  /// Session persistence configuration.
  #[serde(default)]
  pub persistence: PersistenceConfig,
}

/// Application identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Dry-run mode: compute and log order payloads, never submit.
  #[serde(default)]
  pub dry_run: bool,
}

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// CLOB REST API base URL.
  pub exchange_url: String,
  /// Relayer base URL.
  pub relayer_url: String,
  /// Chain RPC endpoint (fallback reads only).
  pub rpc_url: String,
  /// Optional remote signing endpoint. When set, request auth headers
  /// come from this service and the API secret never enters this
  /// process.
  pub signing_url: Option<String>,
  /// Expected chain id (Polygon mainnet).
  #[serde(default = "default_chain_id")]
  pub chain_id: u64,
  /// Request timeout in milliseconds.
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
}

/// Contract addresses and derivation scheme inputs.
///
/// Addresses are hex strings here; parsed and validated at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
  /// Current proxy wallet factory.
  pub proxy_factory: String,
  /// keccak256 of the current proxy creation code.
  pub proxy_init_code_hash: String,
  /// Superseded proxy factory (LegacyWalletRecovery only).
  pub legacy_proxy_factory: String,
  /// Init code hash of the legacy scheme.
  pub legacy_init_code_hash: String,
  /// Collateral token (ERC-20, 6 decimals).
  pub collateral: String,
  /// Conditional position token (ERC-1155).
  pub conditional_tokens: String,
  /// CTF Exchange spender.
  pub ctf_exchange: String,
  /// Neg-risk CTF Exchange spender.
  pub neg_risk_exchange: String,
  /// Neg-risk adapter spender (multi-outcome markets).
  pub neg_risk_adapter: String,
}

/// Deployment polling parameters.
///
/// Both are explicit config inputs so tests can run with near-zero
/// intervals.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
  /// Interval between status polls (milliseconds).
  #[serde(default = "default_poll_interval_ms")]
  pub poll_interval_ms: u64,
  /// Hard deadline for a single deploy/batch (milliseconds).
  #[serde(default = "default_deploy_timeout_ms")]
  pub timeout_ms: u64,
}

impl Default for DeploymentConfig {
  fn default() -> Self {
    Self {
      poll_interval_ms: default_poll_interval_ms(),
      timeout_ms: default_deploy_timeout_ms(),
    }
  }
}

/// Pricing and execution parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
  /// Buffer added to the raw best price so market orders cross the
  /// spread (price units, e.g. 0.03 = 3 percentage points).
  #[serde(default = "default_price_buffer")]
  pub price_buffer: f64,
  /// Hard ceiling on any execution price.
  #[serde(default = "default_max_price")]
  pub max_price: f64,
  /// Order book staleness window in seconds.
  #[serde(default = "default_staleness_secs")]
  pub staleness_secs: u64,
  /// Periodic book refresh interval in seconds.
  #[serde(default = "default_refresh_interval_secs")]
  pub refresh_interval_secs: u64,
  /// Fallback instrument minimum when the source provides none.
  #[serde(default = "default_min_order_size")]
  pub default_min_order_size: f64,
  /// Skip the available-balance pre-submit check.
  #[serde(default)]
  pub bypass_balance_check: bool,
  /// Tokens whose books are kept warm by the refresh task.
  #[serde(default)]
  pub watch_tokens: Vec<String>,
}

impl Default for TradingConfig {
  fn default() -> Self {
    Self {
      price_buffer: default_price_buffer(),
      max_price: default_max_price(),
      staleness_secs: default_staleness_secs(),
      refresh_interval_secs: default_refresh_interval_secs(),
      default_min_order_size: default_min_order_size(),
      bypass_balance_check: false,
      watch_tokens: Vec::new(),
    }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for per-owner session records.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_chain_id() -> u64 {
  137
}

fn default_timeout_ms() -> u64 {
  30_000
}

fn default_poll_interval_ms() -> u64 {
  3_000
}

fn default_deploy_timeout_ms() -> u64 {
  60_000
}

fn default_price_buffer() -> f64 {
  0.03
}

fn default_max_price() -> f64 {
  0.99
}

fn default_staleness_secs() -> u64 {
  10
}

fn default_refresh_interval_secs() -> u64 {
  5
}

fn default_min_order_size() -> f64 {
  5.0
}

fn default_data_dir() -> String {
  "data".to_string()
}
