//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `OwnerSigner`: the externally-held owner key
//! - `ExchangeApi`: CLOB books, credentials, orders
//! - `RelayerApi`: sponsored deployment and batched execution
//! - `ChainReader`: fallback on-chain reads
//! - `SessionStore`: per-owner session persistence

pub mod chain;
pub mod exchange;
pub mod relayer;
pub mod signer;
pub mod store;
