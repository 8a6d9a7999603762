//! Persistence Adapters - Session Records on Disk

pub mod store;

pub use store::FileSessionStore;
