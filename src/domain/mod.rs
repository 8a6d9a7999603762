//! Domain layer - Core business logic and models.
//!
//! Pure types and logic for the gasless proxy-wallet trading core.
//! No I/O anywhere in this module tree (hexagonal architecture inner
//! ring). All types are serializable and testable in isolation.

pub mod address;
pub mod book;
pub mod error;
pub mod intent;
pub mod session;

// Re-export core types for convenience
pub use address::{DerivationScheme, derive_proxy_address, parse_address};
pub use book::OrderBookSnapshot;
pub use error::{SessionError, TradeError, classify_submission_error};
pub use intent::{Direction, OrderIntent, Side};
pub use session::{ApiCredentials, SESSION_SCHEMA_VERSION, Session, SessionStep};
