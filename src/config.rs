//! Configuration Module
//!
//! This module defines all configuration structures for the distributor.
//! Configuration is loaded from TOML files and parsed using serde, then
//! validated once at startup; it is immutable for the rest of the run.

use crate::types::{ConfirmationDepth, PipelineError};
use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// Loaded from a TOML file (e.g. config/default.toml).
///
/// # Example TOML
/// ```toml
/// [rpc]
/// url = "https://api.mainnet-beta.solana.com"
///
/// [multisig]
/// address = "..."
/// vault_index = 0
///
/// [signer]
/// keypair_path = "wallet.json"
///
/// [records]
/// csv_path = "payouts.csv"
///
/// [batch]
/// records_per_transaction = 5
/// transactions_per_batch = 250
///
/// [submission]
/// compute_units = 80000
/// priority_fee_micro_lamports = 200000
/// max_attempts = 120
/// poll_interval_ms = 500
/// target_depth = "confirmed"
///
/// [mint]
/// missing_policy = "default"
/// default_decimals = 9
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcConfig,
    pub multisig: MultisigConfig,
    pub signer: SignerConfig,
    pub records: RecordsConfig,
    pub batch: BatchConfig,
    pub submission: SubmissionConfig,
    pub mint: MintConfig,
}

/// Ledger RPC endpoint configuration
///
/// # Fields
/// - `url`: RPC endpoint for all reads and broadcasts
/// - `address_lookup_table`: optional lookup table threaded into every
///   appended vault message; fetch failures are logged and ignored
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    pub address_lookup_table: Option<String>,
}

/// Multisig account configuration
///
/// # Fields
/// - `address`: the multisig account all batches are created under
/// - `vault_index`: treasury sub-account the transfers draw from
/// - `program_id`: optional override of the well-known multisig program id
#[derive(Debug, Clone, Deserialize)]
pub struct MultisigConfig {
    pub address: String,
    #[serde(default)]
    pub vault_index: u8,
    pub program_id: Option<String>,
}

/// Signer credential configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SignerConfig {
    /// Path to the wallet keypair JSON file
    pub keypair_path: String,
}

/// Input record source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsConfig {
    /// CSV file with headers: token_address, receiver, amount
    pub csv_path: String,
}

/// Batch sizing configuration
///
/// Both ceilings must be at least 1: an OperationUnit is indivisible, so a
/// ceiling of zero cannot be satisfied and is rejected at startup.
///
/// # Fields
/// - `records_per_transaction`: records whose operations share one
///   transaction (kept below the ledger ceiling, leaving headroom for the
///   two fee-control instructions)
/// - `transactions_per_batch`: transaction units appended under one
///   multisig batch
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub records_per_transaction: usize,
    pub transactions_per_batch: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            records_per_transaction: 5,
            transactions_per_batch: 250,
        }
    }
}

/// Submission engine tuning
///
/// # Fields
/// - `compute_units`: compute-unit ceiling prepended to every transaction
/// - `priority_fee_micro_lamports`: priority fee price prepended to every
///   transaction
/// - `max_attempts`: confirmation poll ceiling per submission
/// - `poll_interval_ms`: delay between poll iterations
/// - `target_depth`: confirmation depth that counts as success
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionConfig {
    pub compute_units: u32,
    pub priority_fee_micro_lamports: u64,
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
    pub target_depth: ConfirmationDepth,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            compute_units: 80_000,
            priority_fee_micro_lamports: 200_000,
            max_attempts: 120,
            poll_interval_ms: 500,
            target_depth: ConfirmationDepth::Confirmed,
        }
    }
}

/// What to do when a mint account cannot be fetched
///
/// `Default` warns and assumes a configured decimal count. That assumption
/// miscalculates amounts for low-decimal tokens, so `Fail` aborts the run
/// before any submission instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingMintPolicy {
    Default,
    Fail,
}

/// Mint resolution configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MintConfig {
    pub missing_policy: MissingMintPolicy,
    pub default_decimals: u8,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            missing_policy: MissingMintPolicy::Default,
            default_decimals: 9,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the parts serde cannot check
    ///
    /// Batch ceilings of zero are configuration errors (see `BatchConfig`).
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.batch.records_per_transaction == 0 {
            return Err(PipelineError::Config(
                "batch.records_per_transaction must be at least 1".into(),
            ));
        }
        if self.batch.transactions_per_batch == 0 {
            return Err(PipelineError::Config(
                "batch.transactions_per_batch must be at least 1".into(),
            ));
        }
        if self.submission.max_attempts == 0 {
            return Err(PipelineError::Config(
                "submission.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
