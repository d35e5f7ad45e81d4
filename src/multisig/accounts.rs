//! Multisig account layout
//!
//! Only the fields the pipeline reads at startup matter here: the current
//! transaction counter (batch indices are derived from it) and the member
//! list (the configured signer must appear in it before anything is
//! submitted). The rest of the layout is carried so borsh can walk the data.

use anyhow::{bail, Result};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;

/// One member of the multisig
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct Member {
    pub key: Pubkey,
    /// Permission bitmask (initiate / vote / execute)
    pub permissions: u8,
}

/// On-chain multisig account state
///
/// Mirrors the program's account layout after the 8-byte discriminator.
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct MultisigAccount {
    pub create_key: Pubkey,
    pub config_authority: Pubkey,
    pub threshold: u16,
    pub time_lock: u32,
    /// Monotonic counter; the next batch uses `transaction_index + 1`
    pub transaction_index: u64,
    pub stale_transaction_index: u64,
    pub rent_collector: Option<Pubkey>,
    pub bump: u8,
    pub members: Vec<Member>,
}

impl MultisigAccount {
    /// Parse the account from raw account data
    ///
    /// Skips the 8-byte discriminator and tolerates trailing padding the
    /// program pre-allocates for member growth.
    pub fn from_account_bytes(data: &[u8]) -> Result<Self> {
        if data.len() <= 8 {
            bail!("multisig account data too short: {} bytes", data.len());
        }
        let mut body = &data[8..];
        let account = MultisigAccount::deserialize(&mut body)?;
        Ok(account)
    }

    /// Whether `key` appears in the member list
    pub fn is_member(&self, key: &Pubkey) -> bool {
        self.members.iter().any(|m| &m.key == key)
    }
}
