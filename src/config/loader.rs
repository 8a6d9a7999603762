//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::address::parse_address;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    name = %config.app.name,
    dry_run = config.app.dry_run,
    watch_tokens = config.trading.watch_tokens.len(),
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty endpoint URLs
/// - Well-formed contract addresses
/// - Sensible pricing and polling bounds
fn validate_config(config: &AppConfig) -> Result<()> {
  // Endpoint validation
  anyhow::ensure!(
    !config.api.exchange_url.is_empty(),
    "Exchange API URL must not be empty"
  );
  anyhow::ensure!(
    !config.api.relayer_url.is_empty(),
    "Relayer URL must not be empty"
  );
  anyhow::ensure!(
    !config.api.rpc_url.is_empty(),
    "RPC URL must not be empty"
  );

  // Contract address validation (parse failures carry the bad value)
  for (field, value) in [
    ("proxy_factory", &config.contracts.proxy_factory),
    ("legacy_proxy_factory", &config.contracts.legacy_proxy_factory),
    ("collateral", &config.contracts.collateral),
    ("conditional_tokens", &config.contracts.conditional_tokens),
    ("ctf_exchange", &config.contracts.ctf_exchange),
    ("neg_risk_exchange", &config.contracts.neg_risk_exchange),
    ("neg_risk_adapter", &config.contracts.neg_risk_adapter),
  ] {
    parse_address(value)
      .map(|_| ())
      .map_err(|e| anyhow::anyhow!("contracts.{field}: {e}"))?;
  }

  anyhow::ensure!(
    config.contracts.proxy_init_code_hash.trim_start_matches("0x").len() == 64,
    "proxy_init_code_hash must be a 32-byte hex string"
  );
  anyhow::ensure!(
    config.contracts.legacy_init_code_hash.trim_start_matches("0x").len() == 64,
    "legacy_init_code_hash must be a 32-byte hex string"
  );

  // Pricing validation
  anyhow::ensure!(
    config.trading.price_buffer > 0.0 && config.trading.price_buffer < 0.5,
    "price_buffer must be in (0, 0.5), got {}",
    config.trading.price_buffer
  );
  anyhow::ensure!(
    config.trading.max_price > 0.5 && config.trading.max_price < 1.0,
    "max_price must be in (0.5, 1), got {}",
    config.trading.max_price
  );
  anyhow::ensure!(
    config.trading.staleness_secs > 0,
    "staleness_secs must be positive"
  );
  anyhow::ensure!(
    config.trading.default_min_order_size > 0.0,
    "default_min_order_size must be positive"
  );

  // Polling validation
  anyhow::ensure!(
    config.deployment.poll_interval_ms > 0,
    "deployment.poll_interval_ms must be positive"
  );
  anyhow::ensure!(
    config.deployment.timeout_ms >= config.deployment.poll_interval_ms,
    "deployment.timeout_ms ({}) must be >= poll_interval_ms ({})",
    config.deployment.timeout_ms,
    config.deployment.poll_interval_ms
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_full_config_parses_and_validates() {
    let toml_str = r#"
      [app]
      name = "proxy-trader"

      [api]
      exchange_url = "https://clob.example.com"
      relayer_url = "https://relayer.example.com"
      rpc_url = "https://polygon-rpc.example.com"

      [contracts]
      proxy_factory = "0xaB45c5A4B0c941a2F231C04C3f49182e1A254052"
      proxy_init_code_hash = "0x0101010101010101010101010101010101010101010101010101010101010101"
      legacy_proxy_factory = "0xaacFeEa03eb1561C4e67d661e40682Bd20E3541b"
      legacy_init_code_hash = "0x0202020202020202020202020202020202020202020202020202020202020202"
      collateral = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
      conditional_tokens = "0x4D97DCd97eC945f40cF65F87097ACe5EA0476045"
      ctf_exchange = "0x4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E"
      neg_risk_exchange = "0xC5d563A36AE78145C45a50134d48A1215220f80a"
      neg_risk_adapter = "0xd91E80cF2E7be2e162c6513ceD06f1dD0dA35296"
    "#;

    let config: AppConfig = toml::from_str(toml_str).unwrap();
    validate_config(&config).unwrap();

    // Defaults applied
    assert_eq!(config.deployment.poll_interval_ms, 3_000);
    assert_eq!(config.deployment.timeout_ms, 60_000);
    assert!((config.trading.price_buffer - 0.03).abs() < 1e-12);
    assert_eq!(config.trading.staleness_secs, 10);
  }

  #[test]
  fn test_bad_contract_address_rejected() {
    let toml_str = r#"
      [app]
      name = "proxy-trader"

      [api]
      exchange_url = "https://clob.example.com"
      relayer_url = "https://relayer.example.com"
      rpc_url = "https://polygon-rpc.example.com"

      [contracts]
      proxy_factory = "not-an-address"
      proxy_init_code_hash = "0x0101010101010101010101010101010101010101010101010101010101010101"
      legacy_proxy_factory = "0xaacFeEa03eb1561C4e67d661e40682Bd20E3541b"
      legacy_init_code_hash = "0x0202020202020202020202020202020202020202020202020202020202020202"
      collateral = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
      conditional_tokens = "0x4D97DCd97eC945f40cF65F87097ACe5EA0476045"
      ctf_exchange = "0x4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E"
      neg_risk_exchange = "0xC5d563A36AE78145C45a50134d48A1215220f80a"
      neg_risk_adapter = "0xd91E80cF2E7be2e162c6513ceD06f1dD0dA35296"
    "#;

    let config: AppConfig = toml::from_str(toml_str).unwrap();
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("proxy_factory"));
  }
}
