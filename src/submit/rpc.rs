//! Ledger RPC boundary
//!
//! The submission engine only needs three calls: latest blockhash, raw
//! broadcast, and signature status. They are factored into the `LedgerRpc`
//! trait so the engine's state machine can be driven by a scripted source in
//! tests without a network.

use crate::types::ConfirmationDepth;
use anyhow::Result;
use solana_client::{
    nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig,
};
use solana_sdk::{
    hash::Hash, signature::Signature, transaction::VersionedTransaction,
};
use solana_transaction_status::TransactionConfirmationStatus;
use std::sync::Arc;

/// Observed status of one signature
///
/// `depth` is `None` while no node reports the signature at all (e.g. the
/// transaction was dropped or has not landed yet).
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    pub slot: u64,
    pub depth: Option<ConfirmationDepth>,
    /// Execution error reported by the ledger, if any
    pub err: Option<String>,
}

/// The RPC surface the submission engine depends on
pub trait LedgerRpc {
    /// Fetch the latest blockhash to anchor a new transaction
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Broadcast signed bytes without preflight simulation
    ///
    /// Re-broadcasting the same transaction is idempotent at the ledger
    /// level because the blockhash and signature are fixed.
    async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<Signature>;

    /// Query the confirmation status of one signature
    async fn signature_status(&self, signature: &Signature) -> Result<Option<SignatureRecord>>;
}

/// Production `LedgerRpc` backed by the nonblocking solana-client
#[derive(Clone)]
pub struct SolanaLedger {
    rpc: Arc<RpcClient>,
}

impl SolanaLedger {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

impl LedgerRpc for SolanaLedger {
    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<Signature> {
        // Preflight is skipped deliberately: the caller accepts the risk of
        // a doomed transaction reaching the network over paying simulation
        // latency on every (re-)broadcast.
        let signature = self
            .rpc
            .send_transaction_with_config(
                tx,
                RpcSendTransactionConfig {
                    skip_preflight: true,
                    ..RpcSendTransactionConfig::default()
                },
            )
            .await?;
        Ok(signature)
    }

    async fn signature_status(&self, signature: &Signature) -> Result<Option<SignatureRecord>> {
        let response = self.rpc.get_signature_statuses(&[*signature]).await?;
        let status = response.value.into_iter().next().flatten();
        Ok(status.map(|s| SignatureRecord {
            slot: s.slot,
            depth: s.confirmation_status.map(|c| match c {
                TransactionConfirmationStatus::Processed => ConfirmationDepth::Processed,
                TransactionConfirmationStatus::Confirmed => ConfirmationDepth::Confirmed,
                TransactionConfirmationStatus::Finalized => ConfirmationDepth::Finalized,
            }),
            err: s.err.map(|e| e.to_string()),
        }))
    }
}
