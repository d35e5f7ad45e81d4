//! Bulk token distribution from a multisig-controlled treasury.
//!
//! Converts a flat list of (token, receiver, amount) records into a sequence
//! of on-chain multisig batches: records are turned into operation units,
//! grouped under per-transaction and per-batch ceilings, and each group is
//! driven through the open → append → activate workflow with a resilient
//! submit/confirm/retry engine underneath.

pub mod types; // Shared data model and the pipeline error taxonomy.
pub mod config; // Defines and loads the TOML run configuration.
pub mod records; // Materializes the payout list from CSV.
pub mod mint; // Caches per-token mint metadata.
pub mod payload; // Builds each record's operation unit.
pub mod batch; // Two-level chunking and the batch workflow orchestrator.
pub mod submit; // The submit/confirm/retry state machine.
pub mod multisig; // Multisig program boundary: accounts, PDAs, instructions.
pub mod pipeline; // Top-level sequential run.

// Re-export commonly used types and configurations for easier access.
pub use config::Config;
pub use types::*;
