use serde::Deserialize;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature};
use thiserror::Error;

/// One payout parsed from the input file
///
/// Addresses are validated once at read time; the amount stays a decimal
/// string until the mint's precision is known (conversion happens in the
/// payload generator).
#[derive(Debug, Clone)]
pub struct TransferRecord {
    pub token: Pubkey,
    pub receiver: Pubkey,
    /// Decimal amount as written in the input, e.g. "1,250.5"
    pub amount: String,
}

/// Resolved metadata for one mint
///
/// Cached per distinct token address for the lifetime of a run.
#[derive(Debug, Clone, Copy)]
pub struct MintInfo {
    /// Program that owns the mint account (classic SPL token or a variant)
    pub token_program: Pubkey,
    /// Decimal precision recorded on the mint
    pub decimals: u8,
}

/// Ordered instructions produced for one TransferRecord
///
/// Treated as indivisible by the batcher: the create-account and transfer
/// instructions for one record never land in different transactions.
#[derive(Debug, Clone)]
pub struct OperationUnit {
    pub instructions: Vec<Instruction>,
}

/// A bounded slice of records' operations flattened into one instruction list
///
/// Sized to stay under the ledger's per-transaction ceiling, leaving headroom
/// for the two fee-control instructions the submission engine prepends.
#[derive(Debug, Clone)]
pub struct TransactionUnit {
    pub instructions: Vec<Instruction>,
    /// How many input records this unit covers (for logging)
    pub record_count: usize,
}

/// A bounded list of TransactionUnits appended under one multisig batch
#[derive(Debug, Clone)]
pub struct SubmissionGroup {
    pub units: Vec<TransactionUnit>,
}

/// Identity of one on-chain batch within a run
///
/// `index` is the multisig's transaction counter (read once at startup) plus
/// the group's 1-based ordinal. Strictly increasing across groups, no gaps.
/// Stale if another actor submits to the multisig concurrently; documented
/// risk, not mitigated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchHandle {
    pub index: u64,
    pub ordinal: usize,
}

/// Network consensus level for a submitted transaction
///
/// Ordered least to most durable, so target checks are plain comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationDepth {
    Processed,
    Confirmed,
    Finalized,
}

impl std::fmt::Display for ConfirmationDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmationDepth::Processed => write!(f, "processed"),
            ConfirmationDepth::Confirmed => write!(f, "confirmed"),
            ConfirmationDepth::Finalized => write!(f, "finalized"),
        }
    }
}

/// Result of one successful submission
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub signature: Signature,
    pub status: ConfirmationDepth,
    pub slot: u64,
    /// Poll iterations spent before the target depth was observed
    pub attempts: u32,
}

/// Top-level pipeline errors
///
/// Everything below the pipeline either resolves or is promoted into one of
/// these; nothing is retried above the submission engine's bounded loop.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("signer {signer} is not a member of multisig {multisig}")]
    NotAMember { signer: Pubkey, multisig: Pubkey },

    #[error("mint {token} could not be resolved and decimals policy is fail-fast")]
    MintUnresolved { token: Pubkey },

    #[error("invalid amount {amount:?} for record paying {receiver}: {reason}")]
    BadAmount {
        amount: String,
        receiver: Pubkey,
        reason: String,
    },

    /// A batch was opened on-chain but a later phase failed. The batch and
    /// its draft proposal are still live; an operator must cancel them
    /// manually.
    #[error("batch {batch_index} left orphaned on-chain after {phase} failed: {source}")]
    OrphanedBatch {
        batch_index: u64,
        phase: &'static str,
        #[source]
        source: crate::submit::SubmitError,
    },

    #[error(transparent)]
    Submit(#[from] crate::submit::SubmitError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
