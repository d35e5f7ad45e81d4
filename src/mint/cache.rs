//! Mint metadata cache
//!
//! A pipeline-scoped, explicitly owned map from token address to resolved
//! `MintInfo`. Populated lazily on first sight of a token and never evicted
//! for the lifetime of a run. The pipeline is strictly sequential, so plain
//! owned state is enough; no locking.

use crate::{
    config::{MintConfig, MissingMintPolicy},
    types::{MintInfo, PipelineError},
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{program_pack::Pack, pubkey::Pubkey};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

pub struct MintCache {
    rpc: Arc<RpcClient>,
    config: MintConfig,
    entries: HashMap<Pubkey, MintInfo>,
}

impl MintCache {
    pub fn new(rpc: Arc<RpcClient>, config: MintConfig) -> Self {
        Self {
            rpc,
            config,
            entries: HashMap::new(),
        }
    }

    /// Resolve metadata for `token`, hitting the network only on a miss
    ///
    /// A mint account that cannot be fetched or decoded is handled by the
    /// configured policy: `default` degrades to the configured decimal count
    /// under the classic token program and logs a warning (wrong for
    /// low-decimal tokens), `fail` aborts the run.
    pub async fn resolve(&mut self, token: &Pubkey) -> Result<MintInfo, PipelineError> {
        if let Some(info) = self.entries.get(token) {
            return Ok(*info);
        }

        let fetched = self.fetch(token).await;
        let info = self.admit(token, fetched)?;
        self.entries.insert(*token, info);
        Ok(info)
    }

    /// Fetch the mint account and decode its owner and decimals
    async fn fetch(&self, token: &Pubkey) -> Option<MintInfo> {
        let account = match self.rpc.get_account(token).await {
            Ok(account) => account,
            Err(e) => {
                debug!("mint fetch for {token} failed: {e}");
                return None;
            }
        };
        if account.data.len() < spl_token::state::Mint::LEN {
            debug!("mint account {token} too small to decode");
            return None;
        }
        // Both token program variants share the base mint layout; extensions
        // only ever follow it.
        let mint =
            spl_token::state::Mint::unpack_from_slice(&account.data[..spl_token::state::Mint::LEN])
                .ok()?;
        Some(MintInfo {
            token_program: account.owner,
            decimals: mint.decimals,
        })
    }

    /// Apply the missing-mint policy to a fetch result
    fn admit(
        &self,
        token: &Pubkey,
        fetched: Option<MintInfo>,
    ) -> Result<MintInfo, PipelineError> {
        match fetched {
            Some(info) => Ok(info),
            None => match self.config.missing_policy {
                MissingMintPolicy::Default => {
                    warn!(
                        "mint {token} unavailable; assuming {} decimals under the classic token program",
                        self.config.default_decimals
                    );
                    Ok(MintInfo {
                        token_program: spl_token::id(),
                        decimals: self.config.default_decimals,
                    })
                }
                MissingMintPolicy::Fail => Err(PipelineError::MintUnresolved { token: *token }),
            },
        }
    }

    /// Number of distinct tokens resolved so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pre-populate an entry (tests and dry runs)
    pub fn insert(&mut self, token: Pubkey, info: MintInfo) {
        self.entries.insert(token, info);
    }
}
