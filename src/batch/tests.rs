//! Tests for chunking and the batch workflow
//!
//! Chunking properties are checked directly; the workflow is exercised
//! against an instantly-confirming mock ledger that records every
//! submission.

use crate::{
    batch::{plan_groups, BatchOrchestrator},
    config::SubmissionConfig,
    multisig::{self, MultisigContext},
    submit::{LedgerRpc, SignatureRecord, SubmissionEngine},
    types::{BatchHandle, ConfirmationDepth, OperationUnit, PipelineError},
};
use anyhow::Result;
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::VersionedTransaction,
};
use std::{str::FromStr, sync::Mutex};

/// One synthetic record's worth of operations (two instructions, like the
/// real create + transfer pair), tagged so order can be traced
fn op(tag: u8) -> OperationUnit {
    OperationUnit {
        instructions: vec![
            Instruction::new_with_bytes(Pubkey::new_unique(), &[tag, 0], vec![]),
            Instruction::new_with_bytes(Pubkey::new_unique(), &[tag, 1], vec![]),
        ],
    }
}

fn ops(n: usize) -> Vec<OperationUnit> {
    (0..n).map(|i| op(i as u8)).collect()
}

#[test]
fn test_unit_count_is_ceil_n_over_k() {
    for (n, k, expected) in [(12, 5, 3), (10, 5, 2), (1, 5, 1), (5, 5, 1), (6, 5, 2)] {
        let groups = plan_groups(ops(n), k, 250).unwrap();
        let units: usize = groups.iter().map(|g| g.units.len()).sum();
        assert_eq!(units, expected, "n={n} k={k}");
    }
}

#[test]
fn test_group_count_is_ceil_units_over_m() {
    // 12 records, K=2 -> 6 units; M=4 -> 2 groups
    let groups = plan_groups(ops(12), 2, 4).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].units.len(), 4);
    assert_eq!(groups[1].units.len(), 2);
}

#[test]
fn test_empty_input_yields_zero_groups() {
    let groups = plan_groups(vec![], 5, 250).unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_zero_ceilings_are_configuration_errors() {
    assert!(matches!(
        plan_groups(ops(1), 0, 250),
        Err(PipelineError::Config(_))
    ));
    assert!(matches!(
        plan_groups(ops(1), 5, 0),
        Err(PipelineError::Config(_))
    ));
}

#[test]
fn test_operation_units_are_never_split_and_order_is_preserved() {
    let groups = plan_groups(ops(13), 5, 2).unwrap();

    // Concatenate every unit's instructions across all groups
    let flat: Vec<&Instruction> = groups
        .iter()
        .flat_map(|g| &g.units)
        .flat_map(|u| &u.instructions)
        .collect();
    assert_eq!(flat.len(), 26);

    // Instructions appear in per-record order: (tag,0) then (tag,1), tags
    // ascending; a split or reorder would break the pairing
    for (i, chunk) in flat.chunks(2).enumerate() {
        assert_eq!(chunk[0].data, vec![i as u8, 0]);
        assert_eq!(chunk[1].data, vec![i as u8, 1]);
    }

    // No unit straddles a record boundary
    for group in &groups {
        for unit in &group.units {
            assert_eq!(unit.instructions.len() % 2, 0);
        }
    }
}

/// Mock ledger that confirms every submission on its first poll and records
/// the payload of every initial broadcast
struct RecordingLedger {
    broadcasts: Mutex<Vec<VersionedTransaction>>,
}

impl RecordingLedger {
    fn new() -> Self {
        Self {
            broadcasts: Mutex::new(Vec::new()),
        }
    }
}

impl LedgerRpc for RecordingLedger {
    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::default())
    }

    async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<Signature> {
        let mut sent = self.broadcasts.lock().unwrap();
        // the engine re-broadcasts identical bytes; count each signature once
        if !sent.iter().any(|t| t.signatures[0] == tx.signatures[0]) {
            sent.push(tx.clone());
        }
        Ok(tx.signatures[0])
    }

    async fn signature_status(&self, _signature: &Signature) -> Result<Option<SignatureRecord>> {
        Ok(Some(SignatureRecord {
            slot: 1,
            depth: Some(ConfirmationDepth::Confirmed),
            err: None,
        }))
    }
}

fn test_context(member: Pubkey) -> MultisigContext {
    let program_id = Pubkey::from_str(multisig::SQUADS_PROGRAM_ID).unwrap();
    let ms = Pubkey::new_unique();
    MultisigContext {
        program_id,
        multisig: ms,
        vault: multisig::vault_pda(&program_id, &ms, 0),
        vault_index: 0,
        member,
    }
}

#[tokio::test]
async fn test_twelve_records_make_five_submissions_for_one_batch() {
    // 12 records, K=5, M=250 -> 3 units, 1 group
    let groups = plan_groups(ops(12), 5, 250).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].units.len(), 3);

    let signer = Keypair::new();
    let context = test_context(solana_sdk::signer::Signer::pubkey(&signer));
    let engine = SubmissionEngine::new(
        RecordingLedger::new(),
        signer,
        SubmissionConfig {
            poll_interval_ms: 1,
            ..SubmissionConfig::default()
        },
    );
    let orchestrator = BatchOrchestrator::new(&engine, &context, &[]);

    let current_index = 7u64;
    let handle = BatchHandle {
        index: current_index + 1,
        ordinal: 1,
    };
    orchestrator.execute_group(handle, &groups[0]).await.unwrap();

    let sent = engine.rpc_ref().broadcasts.lock().unwrap();
    // 1 open + 3 appends + 1 activate
    assert_eq!(sent.len(), 5);

    // Every transaction carries the two fee-control instructions up front,
    // so the payload starts at index 2
    let payload_ix_counts: Vec<usize> = sent
        .iter()
        .map(|tx| tx.message.instructions().len() - 2)
        .collect();
    // open combines batch-create and proposal-create; appends and activate
    // are one instruction each
    assert_eq!(payload_ix_counts, vec![2, 1, 1, 1, 1]);

    // Appends are positioned 1..=3: their batch-transaction PDAs must all
    // differ (position is a PDA seed)
    let append_account_sets: Vec<Vec<Pubkey>> = sent[1..4]
        .iter()
        .map(|tx| tx.message.static_account_keys().to_vec())
        .collect();
    assert_ne!(append_account_sets[0], append_account_sets[1]);
    assert_ne!(append_account_sets[1], append_account_sets[2]);
}

#[tokio::test]
async fn test_append_failure_reports_an_orphaned_batch() {
    /// Confirms the open phase, then reports an execution error
    struct FailsAfterOpen {
        polls: Mutex<u32>,
    }

    impl LedgerRpc for FailsAfterOpen {
        async fn latest_blockhash(&self) -> Result<Hash> {
            Ok(Hash::default())
        }
        async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<Signature> {
            Ok(tx.signatures[0])
        }
        async fn signature_status(&self, _s: &Signature) -> Result<Option<SignatureRecord>> {
            let mut polls = self.polls.lock().unwrap();
            *polls += 1;
            // first submission (open) confirms; the next reports failure
            Ok(Some(SignatureRecord {
                slot: 1,
                depth: Some(ConfirmationDepth::Confirmed),
                err: (*polls > 1).then(|| "program error".to_string()),
            }))
        }
    }

    let groups = plan_groups(ops(2), 5, 250).unwrap();
    let signer = Keypair::new();
    let context = test_context(solana_sdk::signer::Signer::pubkey(&signer));
    let engine = SubmissionEngine::new(
        FailsAfterOpen {
            polls: Mutex::new(0),
        },
        signer,
        SubmissionConfig {
            poll_interval_ms: 1,
            ..SubmissionConfig::default()
        },
    );
    let orchestrator = BatchOrchestrator::new(&engine, &context, &[]);

    let handle = BatchHandle { index: 3, ordinal: 1 };
    let err = orchestrator
        .execute_group(handle, &groups[0])
        .await
        .unwrap_err();

    match err {
        PipelineError::OrphanedBatch {
            batch_index, phase, ..
        } => {
            assert_eq!(batch_index, 3);
            assert_eq!(phase, "append");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
