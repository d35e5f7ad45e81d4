//! Multisig Program Boundary
//!
//! The batches this pipeline produces live inside a multisig program (Squads
//! v4). This module is the only place that knows that program's shapes:
//! - `accounts`: the multisig account layout (transaction counter and
//!   member list, both read once at startup)
//! - `instructions`: the four instruction builders the orchestrator consumes
//!   (batch-create, draft-proposal-create, batch-add-transaction,
//!   proposal-activate) plus PDA derivations
//! - `message`: the program's custom wire encoding for the vault
//!   transaction message carried by every append

pub mod accounts;
pub mod instructions;
pub mod message;

pub use accounts::{Member, MultisigAccount};
pub use instructions::{
    batch_add_transaction, batch_create, proposal_activate, proposal_create, vault_pda,
    MultisigContext, SQUADS_PROGRAM_ID,
};
