//! Pipeline Module
//!
//! The top-level run: startup validation, payload generation, grouping, and
//! the strictly sequential group loop. Everything here happens on one
//! logical thread of control: no two ledger-mutating submissions are ever
//! in flight at once, because each phase depends on the confirmed on-chain
//! state produced by the previous one.
//!
//! # Run sequence
//! 1. Validate configuration, load the signer keypair and the record list.
//! 2. Read the multisig account once: the signer must be a member (or the
//!    run aborts with zero submissions) and the current transaction counter
//!    seeds all batch indices.
//! 3. Build one operation unit per record through the mint cache.
//! 4. Chunk into transaction units and submission groups.
//! 5. Best-effort fetch of the configured address lookup table.
//! 6. For each group, in order, run the open/append/activate workflow.

use crate::{
    batch::{plan_groups, BatchOrchestrator},
    config::Config,
    mint::MintCache,
    multisig::{self, MultisigAccount, MultisigContext},
    payload::PayloadGenerator,
    records::read_records,
    submit::{SolanaLedger, SubmissionEngine},
    types::{BatchHandle, PipelineError},
};
use anyhow::Context;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    address_lookup_table::{state::AddressLookupTable, AddressLookupTableAccount},
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
    signer::Signer,
};
use std::{path::Path, str::FromStr, sync::Arc};
use tracing::{debug, info, warn};

/// Load, validate, and run the whole distribution
pub async fn run(config: Config) -> Result<(), PipelineError> {
    config.validate()?;

    let signer = load_signer(&config.signer.keypair_path)?;
    let multisig_address = Pubkey::from_str(&config.multisig.address)
        .map_err(|e| PipelineError::Config(format!("bad multisig address: {e}")))?;
    let program_id = match &config.multisig.program_id {
        Some(id) => Pubkey::from_str(id)
            .map_err(|e| PipelineError::Config(format!("bad multisig program id: {e}")))?,
        None => Pubkey::from_str(multisig::SQUADS_PROGRAM_ID)
            .map_err(|e| PipelineError::Config(format!("bad built-in program id: {e}")))?,
    };

    let records = read_records(Path::new(&config.records.csv_path))?;
    if records.is_empty() {
        info!("no records to distribute; nothing to do");
        return Ok(());
    }

    let rpc = Arc::new(RpcClient::new(config.rpc.url.clone()));

    // Read the multisig once: membership gate + batch index seed. Another
    // actor submitting concurrently makes the seed stale; that risk is
    // documented and not mitigated.
    let account = rpc
        .get_account(&multisig_address)
        .await
        .with_context(|| format!("failed to fetch multisig {multisig_address}"))?;
    let multisig_state = MultisigAccount::from_account_bytes(&account.data)?;
    ensure_member(&multisig_state, &signer.pubkey(), &multisig_address)?;
    let current_index = multisig_state.transaction_index;
    info!(
        "multisig {multisig_address}: {} members, transaction index {current_index}",
        multisig_state.members.len()
    );

    let context = MultisigContext {
        program_id,
        multisig: multisig_address,
        vault: multisig::vault_pda(&program_id, &multisig_address, config.multisig.vault_index),
        vault_index: config.multisig.vault_index,
        member: signer.pubkey(),
    };
    info!("treasury vault: {}", context.vault);

    // Generate payloads, resolving each distinct mint at most once
    let mut mints = MintCache::new(rpc.clone(), config.mint.clone());
    let generator = PayloadGenerator::new(context.vault);
    let mut operations = Vec::with_capacity(records.len());
    for record in &records {
        operations.push(generator.build(record, &mut mints).await?);
    }
    debug!("{} operation units from {} mints", operations.len(), mints.len());

    let groups = plan_groups(
        operations,
        config.batch.records_per_transaction,
        config.batch.transactions_per_batch,
    )?;
    info!(
        "{} records -> {} groups (K={}, M={})",
        records.len(),
        groups.len(),
        config.batch.records_per_transaction,
        config.batch.transactions_per_batch
    );

    let lookup_tables = fetch_lookup_tables(&rpc, config.rpc.address_lookup_table.as_deref()).await;

    let engine = SubmissionEngine::new(
        SolanaLedger::new(rpc),
        signer,
        config.submission.clone(),
    );
    let orchestrator = BatchOrchestrator::new(&engine, &context, &lookup_tables);

    // Strictly sequential: each group's batch index assumes every earlier
    // group has landed.
    for (handle, group) in batch_handles(current_index, groups.len()).into_iter().zip(&groups) {
        orchestrator.execute_group(handle, group).await?;
    }

    info!("distribution complete: {} batches submitted for voting", groups.len());
    Ok(())
}

/// Batch handles for a run: consecutive indices starting just past the
/// multisig's current transaction counter, ordinals 1..=`groups`
pub fn batch_handles(current_index: u64, groups: usize) -> Vec<BatchHandle> {
    (0..groups)
        .map(|i| BatchHandle {
            index: current_index + i as u64 + 1,
            ordinal: i + 1,
        })
        .collect()
}

/// Abort unless the signer appears in the multisig's member list
pub fn ensure_member(
    multisig_state: &MultisigAccount,
    signer: &Pubkey,
    multisig_address: &Pubkey,
) -> Result<(), PipelineError> {
    if multisig_state.is_member(signer) {
        Ok(())
    } else {
        Err(PipelineError::NotAMember {
            signer: *signer,
            multisig: *multisig_address,
        })
    }
}

fn load_signer(path: &str) -> Result<Keypair, PipelineError> {
    read_keypair_file(path)
        .map_err(|e| PipelineError::Config(format!("failed to read keypair {path}: {e}")))
}

/// Best-effort fetch of the configured lookup table
///
/// A failed fetch only costs message compactness, so it is logged and
/// ignored.
async fn fetch_lookup_tables(
    rpc: &RpcClient,
    address: Option<&str>,
) -> Vec<AddressLookupTableAccount> {
    let Some(address) = address else {
        return Vec::new();
    };
    let key = match Pubkey::from_str(address) {
        Ok(key) => key,
        Err(e) => {
            warn!("ignoring malformed lookup table address {address}: {e}");
            return Vec::new();
        }
    };
    match rpc.get_account(&key).await {
        Ok(account) => match AddressLookupTable::deserialize(&account.data) {
            Ok(table) => {
                info!("using lookup table {key} ({} addresses)", table.addresses.len());
                vec![AddressLookupTableAccount {
                    key,
                    addresses: table.addresses.into_owned(),
                }]
            }
            Err(e) => {
                warn!("lookup table {key} failed to decode: {e}");
                Vec::new()
            }
        },
        Err(e) => {
            warn!("lookup table {key} unavailable: {e}");
            Vec::new()
        }
    }
}
