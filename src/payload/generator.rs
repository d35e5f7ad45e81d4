//! Payload Generator Module
//!
//! Produces the ordered instruction list for one transfer record:
//! 1. An idempotent "create receiver associated account" instruction,
//!    safe to replay, a no-op if the account already exists.
//! 2. A decimals-checked transfer that fails on-chain if the asserted
//!    precision mismatches the mint's recorded precision.
//!
//! The pair is an `OperationUnit`: the batcher never splits or reorders it.

use crate::{
    mint::MintCache,
    payload::to_base_units,
    types::{OperationUnit, PipelineError, TransferRecord},
};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token::instruction::TokenInstruction;
use tracing::debug;

/// Builds operation units against one treasury vault
pub struct PayloadGenerator {
    /// Treasury vault PDA: source of funds and authority on every transfer
    vault: Pubkey,
}

impl PayloadGenerator {
    pub fn new(vault: Pubkey) -> Self {
        Self { vault }
    }

    /// Build the `OperationUnit` for one record
    ///
    /// Resolves the token's owning program and precision through the cache
    /// (one network read per distinct token per run), converts the decimal
    /// amount into base units, and emits the two instructions in order.
    pub async fn build(
        &self,
        record: &TransferRecord,
        mints: &mut MintCache,
    ) -> Result<OperationUnit, PipelineError> {
        let mint_info = mints.resolve(&record.token).await?;

        let base_units =
            to_base_units(&record.amount, mint_info.decimals).map_err(|reason| {
                PipelineError::BadAmount {
                    amount: record.amount.clone(),
                    receiver: record.receiver,
                    reason,
                }
            })?;

        let source = get_associated_token_address_with_program_id(
            &self.vault,
            &record.token,
            &mint_info.token_program,
        );
        let destination = get_associated_token_address_with_program_id(
            &record.receiver,
            &record.token,
            &mint_info.token_program,
        );
        debug!(
            "record {} -> {}: {} base units of {}",
            self.vault, record.receiver, base_units, record.token
        );

        let create_destination = create_associated_token_account_idempotent(
            &self.vault,
            &record.receiver,
            &record.token,
            &mint_info.token_program,
        );
        // Built by hand rather than through spl_token::instruction::
        // transfer_checked, which only accepts the classic program id; the
        // resolved program may be a token-2022 variant. The wire encoding is
        // identical across variants.
        let transfer = Instruction {
            program_id: mint_info.token_program,
            accounts: vec![
                AccountMeta::new(source, false),
                AccountMeta::new_readonly(record.token, false),
                AccountMeta::new(destination, false),
                AccountMeta::new_readonly(self.vault, true),
            ],
            data: TokenInstruction::TransferChecked {
                amount: base_units,
                decimals: mint_info.decimals,
            }
            .pack(),
        };

        Ok(OperationUnit {
            instructions: vec![create_destination, transfer],
        })
    }
}
