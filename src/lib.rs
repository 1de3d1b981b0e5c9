//! Phishwatch - a brand-impersonation domain monitor.
//!
//! This library discovers newly observed domain names from certificate
//! transparency logs, flags names lexically close to a watch-list of
//! protected organisations, enriches flagged candidates with registration
//! and live-content signals, classifies them by risk, and persists each
//! finding as an immutable alert.

pub mod app;
pub mod classify;
pub mod cli;
pub mod config;
pub mod core;
pub mod deduplication;
pub mod dns;
pub mod enrichment;
pub mod feed;
pub mod matching;
pub mod monitor;
pub mod report;
pub mod server;
pub mod store;

// Re-export core types for convenience
pub use crate::core::*;
