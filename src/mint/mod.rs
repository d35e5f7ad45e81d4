//! Mint Resolution Module
//!
//! Resolves and caches per-token mint metadata (owning token program and
//! decimal precision) so each distinct token costs at most one network read
//! per run.

mod cache;

pub use cache::MintCache;
