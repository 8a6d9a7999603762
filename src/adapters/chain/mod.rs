//! Chain Adapters - alloy-rs Fallback Reads and Signing
//!
//! Shared RPC provider, raw calldata encoding, the `ChainReader`
//! implementation, and the local owner signer.

pub mod calldata;
pub mod provider;
pub mod reader;
pub mod signer;
