//! Batch Construction Module
//!
//! This module handles grouping and the multisig batch workflow:
//! - `chunker`: pure two-level grouping of operation units into
//!   transaction units and submission groups
//! - `orchestrator`: drives one submission group through the three-phase
//!   multisig workflow (open → append each unit → activate)

mod chunker;
mod orchestrator;
#[cfg(test)]
mod tests;

pub use chunker::plan_groups;
pub use orchestrator::BatchOrchestrator;
