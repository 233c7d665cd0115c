use serde::{Deserialize, Serialize};

use crate::types::{Address, Hash32, TokenId, Wei};

/// Events emitted by successful operations, in emission order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    // ── Sale ─────────────────────────────────────────────────────────────────
    Bought {
        token_id: TokenId,
        buyer: Address,
        price: Wei,
    },
    /// Metadata for `token_id` is final.
    PermanentUri {
        uri: String,
        token_id: TokenId,
    },
    MerkleRootSet {
        root: Hash32,
        pointer: String,
    },
    FundingWalletSet {
        wallet: Address,
    },
    NftTransfer {
        collection: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    },

    // ── Staking ──────────────────────────────────────────────────────────────
    NftAdded {
        collection: Address,
    },
    NftReceived {
        token_id: TokenId,
        collection: Address,
        depositor: Address,
    },
    /// Reward-token transfer; mints have `from == Address::ZERO`.
    RewardTransfer {
        from: Address,
        to: Address,
        amount: Wei,
    },
    Claim {
        depositor: Address,
        amount: Wei,
    },
    Withdraw {
        token_id: TokenId,
        collection: Address,
        depositor: Address,
    },
    MinterRoleGranted {
        account: Address,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Bought { .. } => "Bought",
            Event::PermanentUri { .. } => "PermanentURI",
            Event::MerkleRootSet { .. } => "MerkleRootSet",
            Event::FundingWalletSet { .. } => "FundingWalletSet",
            Event::NftTransfer { .. } => "NftTransfer",
            Event::NftAdded { .. } => "NftAdded",
            Event::NftReceived { .. } => "NftReceived",
            Event::RewardTransfer { .. } => "RewardTransfer",
            Event::Claim { .. } => "Claim",
            Event::Withdraw { .. } => "Withdraw",
            Event::MinterRoleGranted { .. } => "MinterRoleGranted",
        }
    }
}
