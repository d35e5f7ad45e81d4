//! Multisig instruction builders
//!
//! Builds the four instructions the batch workflow consumes. Account
//! orderings, PDA seeds and argument layouts follow the multisig program's
//! interface (Squads v4); instruction data is an 8-byte anchor discriminator
//! followed by borsh-encoded arguments.

use borsh::BorshSerialize;
use solana_sdk::{
    hash::hash,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

/// Well-known address of the multisig program
pub const SQUADS_PROGRAM_ID: &str = "SQDS4ep65T869zMMBKyuUq6aD6EgTu8psMjkvj52pCf";

const SEED_PREFIX: &[u8] = b"multisig";
const SEED_VAULT: &[u8] = b"vault";
const SEED_TRANSACTION: &[u8] = b"transaction";
const SEED_PROPOSAL: &[u8] = b"proposal";
const SEED_BATCH_TRANSACTION: &[u8] = b"batch_transaction";

/// Everything the builders need to address one multisig
///
/// Assembled once at startup and immutable for the run.
#[derive(Debug, Clone)]
pub struct MultisigContext {
    pub program_id: Pubkey,
    pub multisig: Pubkey,
    pub vault: Pubkey,
    pub vault_index: u8,
    /// The configured signer; creator, member and rent payer of everything
    /// this pipeline submits
    pub member: Pubkey,
}

/// Anchor global instruction discriminator
fn discriminator(name: &str) -> [u8; 8] {
    let digest = hash(format!("global:{name}").as_bytes()).to_bytes();
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

fn instruction_data<T: BorshSerialize>(name: &str, args: &T) -> Vec<u8> {
    let mut data = discriminator(name).to_vec();
    // serialization of plain borsh structs into a Vec cannot fail
    data.extend(borsh::to_vec(args).expect("borsh encode"));
    data
}

/// Derive the treasury vault PDA for a vault index
pub fn vault_pda(program_id: &Pubkey, multisig: &Pubkey, vault_index: u8) -> Pubkey {
    Pubkey::find_program_address(
        &[SEED_PREFIX, multisig.as_ref(), SEED_VAULT, &[vault_index]],
        program_id,
    )
    .0
}

/// PDA of the batch account at a transaction index
fn batch_pda(program_id: &Pubkey, multisig: &Pubkey, index: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            multisig.as_ref(),
            SEED_TRANSACTION,
            &index.to_le_bytes(),
        ],
        program_id,
    )
    .0
}

/// PDA of the proposal attached to a transaction index
fn proposal_pda(program_id: &Pubkey, multisig: &Pubkey, index: u64) -> Pubkey {
    Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            multisig.as_ref(),
            SEED_TRANSACTION,
            &index.to_le_bytes(),
            SEED_PROPOSAL,
        ],
        program_id,
    )
    .0
}

/// PDA of one sub-transaction inside a batch
fn batch_transaction_pda(
    program_id: &Pubkey,
    multisig: &Pubkey,
    batch_index: u64,
    position: u32,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            SEED_PREFIX,
            multisig.as_ref(),
            SEED_TRANSACTION,
            &batch_index.to_le_bytes(),
            SEED_BATCH_TRANSACTION,
            &position.to_le_bytes(),
        ],
        program_id,
    )
    .0
}

#[derive(BorshSerialize)]
struct BatchCreateArgs {
    vault_index: u8,
    memo: Option<String>,
}

/// Open a new batch at `batch_index`
///
/// The multisig account is writable: opening a batch increments its
/// transaction counter, the same counter the pipeline seeds batch indices
/// from.
pub fn batch_create(ctx: &MultisigContext, batch_index: u64) -> Instruction {
    let batch = batch_pda(&ctx.program_id, &ctx.multisig, batch_index);
    Instruction {
        program_id: ctx.program_id,
        accounts: vec![
            AccountMeta::new(ctx.multisig, false),
            AccountMeta::new(batch, false),
            AccountMeta::new_readonly(ctx.member, true),
            AccountMeta::new(ctx.member, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: instruction_data(
            "batch_create",
            &BatchCreateArgs {
                vault_index: ctx.vault_index,
                memo: None,
            },
        ),
    }
}

#[derive(BorshSerialize)]
struct ProposalCreateArgs {
    transaction_index: u64,
    draft: bool,
}

/// Create the (draft) proposal that will vote on the batch
pub fn proposal_create(ctx: &MultisigContext, batch_index: u64) -> Instruction {
    let proposal = proposal_pda(&ctx.program_id, &ctx.multisig, batch_index);
    Instruction {
        program_id: ctx.program_id,
        accounts: vec![
            AccountMeta::new_readonly(ctx.multisig, false),
            AccountMeta::new(proposal, false),
            AccountMeta::new_readonly(ctx.member, true),
            AccountMeta::new(ctx.member, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: instruction_data(
            "proposal_create",
            &ProposalCreateArgs {
                transaction_index: batch_index,
                draft: true,
            },
        ),
    }
}

#[derive(BorshSerialize)]
struct BatchAddTransactionArgs {
    ephemeral_signers: u8,
    transaction_message: Vec<u8>,
}

/// Append one sub-transaction to an open batch
///
/// # Arguments
/// * `batch_index` - index the batch was opened at
/// * `position` - 1-based position of this sub-transaction within the batch
/// * `transaction_message` - the wire-encoded vault message (see
///   [`crate::multisig::message`])
pub fn batch_add_transaction(
    ctx: &MultisigContext,
    batch_index: u64,
    position: u32,
    transaction_message: Vec<u8>,
) -> Instruction {
    let batch = batch_pda(&ctx.program_id, &ctx.multisig, batch_index);
    let proposal = proposal_pda(&ctx.program_id, &ctx.multisig, batch_index);
    let transaction = batch_transaction_pda(&ctx.program_id, &ctx.multisig, batch_index, position);
    Instruction {
        program_id: ctx.program_id,
        accounts: vec![
            AccountMeta::new_readonly(ctx.multisig, false),
            AccountMeta::new_readonly(ctx.member, true),
            AccountMeta::new_readonly(proposal, false),
            AccountMeta::new(batch, false),
            AccountMeta::new(transaction, false),
            AccountMeta::new(ctx.member, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: instruction_data(
            "batch_add_transaction",
            &BatchAddTransactionArgs {
                ephemeral_signers: 0,
                transaction_message,
            },
        ),
    }
}

/// Move the proposal out of draft so members can vote on it
pub fn proposal_activate(ctx: &MultisigContext, batch_index: u64) -> Instruction {
    let proposal = proposal_pda(&ctx.program_id, &ctx.multisig, batch_index);
    Instruction {
        program_id: ctx.program_id,
        accounts: vec![
            AccountMeta::new_readonly(ctx.multisig, false),
            AccountMeta::new_readonly(ctx.member, true),
            AccountMeta::new(proposal, false),
        ],
        // no arguments beyond the discriminator
        data: discriminator("proposal_activate").to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn test_ctx() -> MultisigContext {
        let program_id = Pubkey::from_str(SQUADS_PROGRAM_ID).unwrap();
        let multisig = Pubkey::new_unique();
        MultisigContext {
            program_id,
            multisig,
            vault: vault_pda(&program_id, &multisig, 0),
            vault_index: 0,
            member: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_discriminator_prefixes_instruction_data() {
        let ctx = test_ctx();
        let ix = batch_create(&ctx, 5);
        assert_eq!(&ix.data[..8], &discriminator("batch_create"));
        // vault_index byte follows the discriminator
        assert_eq!(ix.data[8], 0);
    }

    #[test]
    fn test_batch_create_writes_the_multisig_counter() {
        let ctx = test_ctx();
        let ix = batch_create(&ctx, 5);
        // the program increments transaction_index on the multisig account
        assert_eq!(ix.accounts[0].pubkey, ctx.multisig);
        assert!(ix.accounts[0].is_writable);
        assert!(!ix.accounts[0].is_signer);
        // the member pays rent for the new batch account
        assert!(ix.accounts[3].is_writable);
        assert!(ix.accounts[3].is_signer);
    }

    #[test]
    fn test_append_leaves_the_multisig_readonly() {
        let ctx = test_ctx();
        let ix = batch_add_transaction(&ctx, 5, 1, vec![0; 4]);
        // appending touches the batch and transaction accounts, never the
        // multisig's counter
        assert_eq!(ix.accounts[0].pubkey, ctx.multisig);
        assert!(!ix.accounts[0].is_writable);
        // rent payer sits after the new transaction account
        assert_eq!(ix.accounts[5].pubkey, ctx.member);
        assert!(ix.accounts[5].is_writable);
        assert!(ix.accounts[5].is_signer);
    }

    #[test]
    fn test_pdas_differ_per_index_and_position() {
        let ctx = test_ctx();
        let a = batch_transaction_pda(&ctx.program_id, &ctx.multisig, 5, 1);
        let b = batch_transaction_pda(&ctx.program_id, &ctx.multisig, 5, 2);
        let c = batch_transaction_pda(&ctx.program_id, &ctx.multisig, 6, 1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        // Deterministic for identical inputs
        assert_eq!(a, batch_transaction_pda(&ctx.program_id, &ctx.multisig, 5, 1));
    }

    #[test]
    fn test_proposal_create_is_a_draft() {
        let ctx = test_ctx();
        let ix = proposal_create(&ctx, 9);
        // args: index u64 (little endian) then draft bool
        assert_eq!(&ix.data[8..16], &9u64.to_le_bytes());
        assert_eq!(ix.data[16], 1);
    }

    #[test]
    fn test_activate_carries_no_args() {
        let ctx = test_ctx();
        let ix = proposal_activate(&ctx, 1);
        assert_eq!(ix.data.len(), 8);
        assert_eq!(ix.accounts.len(), 3);
    }
}
