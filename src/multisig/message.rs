//! Vault transaction message encoding
//!
//! The multisig program stores each appended sub-transaction as its own
//! compact message format: a v0-style compiled message with single-byte
//! length prefixes (u16 for instruction data). This module compiles an
//! instruction list with the vault as payer and re-encodes the result into
//! that wire format.
//!
//! The inner message is anchored to an all-zero blockhash: it is never
//! broadcast as-is, the program patches the blockhash at execution time.

use anyhow::{bail, Context, Result};
use solana_sdk::{
    address_lookup_table::AddressLookupTableAccount, hash::Hash, instruction::Instruction,
    message::v0, pubkey::Pubkey,
};

/// Compile `instructions` into the program's wire format
///
/// # Arguments
/// * `vault` - treasury vault PDA, payer and authority of the inner message
/// * `instructions` - the sub-transaction's payload
/// * `lookup_tables` - address lookup tables available for compaction
pub fn compile_vault_message(
    vault: &Pubkey,
    instructions: &[Instruction],
    lookup_tables: &[AddressLookupTableAccount],
) -> Result<Vec<u8>> {
    let message = v0::Message::try_compile(vault, instructions, lookup_tables, Hash::default())
        .context("failed to compile vault message")?;
    encode(&message)
}

/// Re-encode a compiled v0 message into the compact wire layout
fn encode(message: &v0::Message) -> Result<Vec<u8>> {
    let header = &message.header;
    let num_static_keys = message.account_keys.len();
    if num_static_keys > u8::MAX as usize {
        bail!("too many static account keys: {num_static_keys}");
    }
    let num_signers = header.num_required_signatures;
    let writable_signers = num_signers
        .checked_sub(header.num_readonly_signed_accounts)
        .context("malformed message header")?;
    let non_signers = num_static_keys as u8 - num_signers;
    let writable_non_signers = non_signers
        .checked_sub(header.num_readonly_unsigned_accounts)
        .context("malformed message header")?;

    let mut out = Vec::new();
    out.push(num_signers);
    out.push(writable_signers);
    out.push(writable_non_signers);

    out.push(num_static_keys as u8);
    for key in &message.account_keys {
        out.extend_from_slice(key.as_ref());
    }

    out.push(u8::try_from(message.instructions.len()).context("too many instructions")?);
    for ix in &message.instructions {
        out.push(ix.program_id_index);
        out.push(u8::try_from(ix.accounts.len()).context("too many instruction accounts")?);
        out.extend_from_slice(&ix.accounts);
        let data_len = u16::try_from(ix.data.len()).context("instruction data too long")?;
        out.extend_from_slice(&data_len.to_le_bytes());
        out.extend_from_slice(&ix.data);
    }

    out.push(
        u8::try_from(message.address_table_lookups.len()).context("too many lookup tables")?,
    );
    for lookup in &message.address_table_lookups {
        out.extend_from_slice(lookup.account_key.as_ref());
        out.push(u8::try_from(lookup.writable_indexes.len()).context("lookup overflow")?);
        out.extend_from_slice(&lookup.writable_indexes);
        out.push(u8::try_from(lookup.readonly_indexes.len()).context("lookup overflow")?);
        out.extend_from_slice(&lookup.readonly_indexes);
    }

    Ok(out)
}
