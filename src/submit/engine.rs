//! Submission Engine Module
//!
//! Wraps an arbitrary instruction list into a signed, fee-prioritized
//! transaction and drives it through broadcast and confirmation.
//!
//! # State machine
//! `Built → Broadcast → Polling → {Finalized, Failed}`
//!
//! - **Built**: two fee-control instructions (compute-unit ceiling,
//!   priority-fee price) are prepended, the list is compiled into a v0
//!   message against the latest blockhash and signed by the sole signer.
//! - **Broadcast**: sent once, skipping preflight. A failed first broadcast
//!   is fatal.
//! - **Polling**: bounded loop. Every iteration below the target depth
//!   re-broadcasts the identical signed bytes, which compensates for nodes
//!   dropping unconfirmed transactions from their forwarding queues.
//!   Re-broadcast and poll errors are swallowed; they count against the
//!   attempt ceiling and nothing else.
//! - **Finalized / Failed**: the caller always gets either a status at or
//!   above the target depth, or an error. Never a silent partial.

use crate::{
    config::SubmissionConfig,
    submit::{LedgerRpc, SignatureRecord, SubmitError},
    types::SubmissionOutcome,
};
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::VersionedTransaction,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Phases of one logical submission
///
/// Tracked explicitly so failures can say exactly where the submission
/// stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Built,
    Broadcast,
    Polling,
    Finalized,
    Failed,
}

/// Drives one transaction at a time through broadcast and confirmation
///
/// Holds the sole signer for the run; all submissions are strictly
/// sequential, so the engine is never shared across in-flight work.
pub struct SubmissionEngine<R> {
    rpc: R,
    signer: Keypair,
    config: SubmissionConfig,
}

impl<R: LedgerRpc> SubmissionEngine<R> {
    pub fn new(rpc: R, signer: Keypair, config: SubmissionConfig) -> Self {
        Self { rpc, signer, config }
    }

    /// Public key of the configured signer
    pub fn signer_pubkey(&self) -> solana_sdk::pubkey::Pubkey {
        self.signer.pubkey()
    }

    #[cfg(test)]
    pub(crate) fn rpc_ref(&self) -> &R {
        &self.rpc
    }

    /// Submit an instruction list and wait for the target depth
    ///
    /// # Arguments
    /// * `instructions` - payload instructions; the two fee-control
    ///   instructions are prepended here, so callers must budget for them
    ///
    /// # Returns
    /// * `Ok(SubmissionOutcome)` once the observed depth meets the target
    /// * `Err(SubmitError)` on build/broadcast failure, an on-chain
    ///   execution error, or an exhausted attempt ceiling
    pub async fn submit(
        &self,
        instructions: Vec<Instruction>,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let tx = self.build(instructions).await?;
        debug!("state: {:?}", SubmissionState::Built);

        // Broadcast once; the signature identifies the transaction for the
        // rest of its life.
        let signature = self
            .rpc
            .send_transaction(&tx)
            .await
            .map_err(|e| SubmitError::Broadcast(e.to_string()))?;
        debug!("state: {:?}", SubmissionState::Broadcast);
        info!("broadcast {signature}");

        debug!("state: {:?}", SubmissionState::Polling);
        let outcome = self.poll(&tx, signature).await;
        match &outcome {
            Ok(o) => {
                debug!("state: {:?}", SubmissionState::Finalized);
                info!(
                    "{} reached {} in {} attempts (slot {})",
                    o.signature, o.status, o.attempts, o.slot
                );
            }
            Err(e) => {
                debug!("state: {:?}", SubmissionState::Failed);
                warn!("submission failed: {e}");
            }
        }
        outcome
    }

    /// Build and sign the versioned transaction
    async fn build(
        &self,
        instructions: Vec<Instruction>,
    ) -> Result<VersionedTransaction, SubmitError> {
        let blockhash = self.rpc.latest_blockhash().await?;

        let mut all = Vec::with_capacity(instructions.len() + 2);
        all.push(ComputeBudgetInstruction::set_compute_unit_limit(
            self.config.compute_units,
        ));
        all.push(ComputeBudgetInstruction::set_compute_unit_price(
            self.config.priority_fee_micro_lamports,
        ));
        all.extend(instructions);

        let message = v0::Message::try_compile(&self.signer.pubkey(), &all, &[], blockhash)
            .map_err(|e| SubmitError::Build(anyhow::anyhow!("message compile failed: {e}")))?;
        let tx = VersionedTransaction::try_new(VersionedMessage::V0(message), &[&self.signer])
            .map_err(|e| SubmitError::Build(anyhow::anyhow!("signing failed: {e}")))?;
        Ok(tx)
    }

    /// Poll until the target depth, re-broadcasting each iteration
    async fn poll(
        &self,
        tx: &VersionedTransaction,
        signature: Signature,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut attempts: u32 = 0;
        let mut last_seen: Option<SignatureRecord> = None;

        while attempts < self.config.max_attempts {
            attempts += 1;

            match self.rpc.signature_status(&signature).await {
                Ok(Some(record)) => {
                    if let Some(error) = record.err.clone() {
                        return Err(SubmitError::Execution { signature, error });
                    }
                    if record.depth.is_some_and(|d| d >= self.config.target_depth) {
                        return Ok(SubmissionOutcome {
                            signature,
                            // depth checked just above
                            status: record.depth.unwrap_or(self.config.target_depth),
                            slot: record.slot,
                            attempts,
                        });
                    }
                    debug!(
                        "attempt {attempts}: {signature} at {:?}, waiting for {}",
                        record.depth, self.config.target_depth
                    );
                    last_seen = Some(record);
                }
                Ok(None) => {
                    debug!("attempt {attempts}: {signature} not yet visible");
                }
                Err(e) => {
                    // Transient network error; the next iteration retries
                    // regardless, so it only costs one attempt.
                    debug!("attempt {attempts}: status poll failed: {e}");
                }
            }

            // Best-effort re-broadcast of the identical signed bytes to
            // survive forwarding-queue pruning. Failures are swallowed.
            if let Err(e) = self.rpc.send_transaction(tx).await {
                debug!("re-broadcast failed: {e}");
            }

            sleep(interval).await;
        }

        if let Some(record) = last_seen {
            debug!("giving up on {signature}; last seen at {:?}", record.depth);
        }
        Err(SubmitError::AttemptsExhausted { signature, attempts })
    }
}
