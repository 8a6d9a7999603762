//! Relayer Adapter - Sponsored Transaction HTTP Client

pub mod client;

pub use client::HttpRelayer;
