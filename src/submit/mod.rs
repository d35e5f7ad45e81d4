//! Submission Module
//!
//! This module owns the submit/confirm/retry state machine:
//! - `LedgerRpc`: narrow trait over the RPC calls the engine needs
//! - `SolanaLedger`: production implementation backed by solana-client
//! - `SubmissionEngine`: builds, signs, broadcasts and confirms one
//!   transaction at a time

mod engine;
mod rpc;

pub use engine::{SubmissionEngine, SubmissionState};
pub use rpc::{LedgerRpc, SignatureRecord, SolanaLedger};

use solana_sdk::signature::Signature;
use thiserror::Error;

/// Failures the submission engine can surface
///
/// Any of these is fatal for the enclosing pipeline: the orchestrator never
/// retries above the engine's own bounded poll loop.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Building or signing the transaction failed before broadcast
    #[error("failed to build transaction: {0}")]
    Build(#[from] anyhow::Error),

    /// The initial broadcast was rejected; nothing reached the network
    #[error("initial broadcast failed: {0}")]
    Broadcast(String),

    /// The ledger recorded the transaction with an execution error
    #[error("transaction {signature} failed on-chain: {error}")]
    Execution { signature: Signature, error: String },

    /// The poll ceiling was exhausted without reaching the target depth
    #[error("transaction {signature} unconfirmed after {attempts} attempts")]
    AttemptsExhausted { signature: Signature, attempts: u32 },
}
