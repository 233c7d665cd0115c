use serde::{Deserialize, Serialize};

use crate::types::{Address, Timestamp, Wei};

// ── NftStatus ─────────────────────────────────────────────────────────────────

/// Registration status recorded when a collection is added to staking.
///
/// Frozen at `addNFT` time; deposits are gated by the live `is_active`
/// recomputation instead. Discriminants are part of the query surface.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum NftStatus {
    #[default]
    NotAdded = 0,
    Active = 1,
    PendingThreshold = 2,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NftInfo {
    /// Minimum minted percentage of max supply, in `[0, 100]`.
    pub percentage_threshold: u8,
    pub status: NftStatus,
}

// ── StakeInfo ─────────────────────────────────────────────────────────────────

/// Per-depositor accrual state. Created on first deposit, never deleted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StakeInfo {
    pub token_count: u64,
    /// Accrual anchor: start of the currently open reward interval.
    pub start_date: Timestamp,
}

impl StakeInfo {
    pub fn is_idle(&self) -> bool {
        self.token_count == 0
    }
}

// ── StakingContract ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StakingContract {
    pub address: Address,
    /// May register collections.
    pub owner: Address,
    pub reward_token: Address,
}

// ── RewardToken ───────────────────────────────────────────────────────────────

/// Role-gated fungible reward token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardToken {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    /// Sole account allowed to grant the minter role.
    pub admin: Address,
    pub minters: Vec<Address>,
    pub total_supply: Wei,
}

impl RewardToken {
    pub fn is_minter(&self, account: &Address) -> bool {
        self.minters.contains(account)
    }
}
