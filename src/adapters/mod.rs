//! Adapters Layer - Port Implementations
//!
//! Concrete implementations of the ports over reqwest (exchange,
//! relayer, remote signing), alloy (chain reads, local signing), and
//! the filesystem (session persistence).

pub mod api;
pub mod chain;
pub mod persistence;
pub mod relayer;
