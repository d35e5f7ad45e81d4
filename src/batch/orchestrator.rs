//! Batch Orchestrator Module
//!
//! Drives one submission group through the three-phase multisig workflow,
//! every phase wrapped by the submission engine and strictly sequential:
//!
//! 1. **Open**: one transaction combining batch-create and draft-proposal-
//!    create at the group's batch index.
//! 2. **Append**: one transaction per unit, in order, tagged with its
//!    1-based position within the group. Each append waits for the previous
//!    submission to reach the target depth, since positions are assigned on-chain
//!    by order of arrival, so appends must never race.
//! 3. **Activate**: mark the proposal ready for voting, only after every
//!    append has landed.
//!
//! Any phase failure aborts the run. Once the open phase has landed, a
//! failure is reported as an orphaned batch carrying the batch index: the
//! batch and its draft proposal stay on-chain and must be cancelled by an
//! operator, there is no auto-rollback. An open that exhausts its poll
//! attempts is reported as a plain submission error even though the
//! transaction may still land afterwards; that case also needs operator
//! reconciliation against the logged batch index.

use crate::{
    multisig::{self, MultisigContext},
    submit::{LedgerRpc, SubmissionEngine, SubmitError},
    types::{BatchHandle, PipelineError, SubmissionGroup},
};
use solana_sdk::address_lookup_table::AddressLookupTableAccount;
use tracing::info;

pub struct BatchOrchestrator<'a, R> {
    engine: &'a SubmissionEngine<R>,
    context: &'a MultisigContext,
    /// Lookup tables threaded into every appended vault message
    lookup_tables: &'a [AddressLookupTableAccount],
}

impl<'a, R: LedgerRpc> BatchOrchestrator<'a, R> {
    pub fn new(
        engine: &'a SubmissionEngine<R>,
        context: &'a MultisigContext,
        lookup_tables: &'a [AddressLookupTableAccount],
    ) -> Self {
        Self {
            engine,
            context,
            lookup_tables,
        }
    }

    /// Execute the full workflow for one group
    ///
    /// # Arguments
    /// * `handle` - the group's batch index and run ordinal
    /// * `group` - the units to append, in order
    pub async fn execute_group(
        &self,
        handle: BatchHandle,
        group: &SubmissionGroup,
    ) -> Result<(), PipelineError> {
        info!(
            "group #{} -> batch index {} ({} units)",
            handle.ordinal,
            handle.index,
            group.units.len()
        );

        // Phase 1: open. Batch and draft proposal are created in one
        // transaction. "Nothing on-chain" is only certain for a rejected
        // broadcast; a confirmation timeout here can still land later.
        self.engine
            .submit(vec![
                multisig::batch_create(self.context, handle.index),
                multisig::proposal_create(self.context, handle.index),
            ])
            .await?;
        info!("batch {} opened", handle.index);

        // Phase 2: append every unit, positions 1..=len within this group.
        for (offset, unit) in group.units.iter().enumerate() {
            let position = offset as u32 + 1;
            // The batch is already open, so even a local compile failure
            // leaves an orphan behind.
            let message = multisig::message::compile_vault_message(
                &self.context.vault,
                &unit.instructions,
                self.lookup_tables,
            )
            .map_err(|e| {
                self.orphaned(handle, "append", PipelineError::Submit(SubmitError::Build(e)))
            })?;

            self.engine
                .submit(vec![multisig::batch_add_transaction(
                    self.context,
                    handle.index,
                    position,
                    message,
                )])
                .await
                .map_err(|e| {
                    self.orphaned(handle, "append", PipelineError::Submit(e))
                })?;
            info!(
                "batch {}: appended unit {}/{} ({} records)",
                handle.index,
                position,
                group.units.len(),
                unit.record_count
            );
        }

        // Phase 3: activate, only now that every append has landed.
        self.engine
            .submit(vec![multisig::proposal_activate(self.context, handle.index)])
            .await
            .map_err(|e| self.orphaned(handle, "activate", PipelineError::Submit(e)))?;
        info!("batch {} activated, ready for voting", handle.index);

        Ok(())
    }

    /// Promote a post-open failure into the orphaned-batch terminal state
    fn orphaned(
        &self,
        handle: BatchHandle,
        phase: &'static str,
        error: PipelineError,
    ) -> PipelineError {
        match error {
            PipelineError::Submit(source) => PipelineError::OrphanedBatch {
                batch_index: handle.index,
                phase,
                source,
            },
            other => other,
        }
    }
}
