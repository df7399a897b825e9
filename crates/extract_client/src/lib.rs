//! Extraction-service HTTP client.
//!
//! Blocking reqwest client (no async runtime required). One call: binary
//! content in, the service's `extractedData` object out. No retry and no
//! engine-level timeout policy — a caller that wants either wraps this
//! client externally; only the transport itself carries a 60 s limit.

pub mod client;
pub mod config;

pub use client::{ExtractClient, ExtractError, ExtractKind};
pub use config::ServiceConfig;
