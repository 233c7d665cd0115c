use serde::{Deserialize, Serialize};

use crate::error::NuggetError;
use crate::event::Event;
use crate::types::{Address, Hash32, Timestamp, TokenId, Wei};

// ── Call ──────────────────────────────────────────────────────────────────────

/// Every state-changing operation is one of these variants.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Call {
    // ── Sale ─────────────────────────────────────────────────────────────────

    /// Purchase a single id. Payable: value must equal the caller's price.
    Buy {
        collection: Address,
        proof: Vec<Hash32>,
        token_id: TokenId,
    },

    /// Purchase several ids at one price snapshot. Payable: value must equal
    /// price × ids.len().
    BuyBulk {
        collection: Address,
        proof: Vec<Hash32>,
        token_ids: Vec<TokenId>,
    },

    /// Replace the allow-list root and its pointer together. Owner only.
    SetMerkleRoot {
        collection: Address,
        root: Hash32,
        pointer: String,
    },

    /// Owner only; the zero address is rejected.
    SetFundingWallet {
        collection: Address,
        wallet: Address,
    },

    /// Move a held token. Sending to the staking contract deposits it.
    TransferNft {
        collection: Address,
        to: Address,
        token_id: TokenId,
    },

    // ── Staking ──────────────────────────────────────────────────────────────

    /// Register a collection with staking. Staking owner only.
    AddNft {
        collection: Address,
        percentage_threshold: u8,
    },

    /// Settle and mint accrued rewards to the caller.
    Claim,

    /// Return a deposited token to its depositor, settling rewards first.
    WithdrawNft {
        collection: Address,
        token_id: TokenId,
    },

    /// Receipt hook invoked directly. The caller is taken as the collection;
    /// accepted only for tokens the staking contract actually holds.
    OnNftReceived {
        from: Address,
        token_id: TokenId,
    },

    // ── Reward token ─────────────────────────────────────────────────────────

    /// Grant the reward-token minter role. Reward-token admin only.
    GrantMinterRole {
        account: Address,
    },
}

impl Call {
    pub fn is_payable(&self) -> bool {
        matches!(self, Call::Buy { .. } | Call::BuyBulk { .. })
    }

    /// Short label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Call::Buy { .. } => "buy",
            Call::BuyBulk { .. } => "buyBulk",
            Call::SetMerkleRoot { .. } => "setMerkleRoot",
            Call::SetFundingWallet { .. } => "setFundingWallet",
            Call::TransferNft { .. } => "transferNft",
            Call::AddNft { .. } => "addNFT",
            Call::Claim => "claim",
            Call::WithdrawNft { .. } => "withdrawNft",
            Call::OnNftReceived { .. } => "onNftReceived",
            Call::GrantMinterRole { .. } => "grantMinterRole",
        }
    }
}

// ── Transaction ───────────────────────────────────────────────────────────────

/// One externally invoked operation.
///
/// `caller` is taken as given: nothing here verifies a signature. The
/// `Unauthorized` and `NotOwner` checks only compare this field, so they are
/// access control only when whoever submits the transaction has already
/// authenticated `caller`. The node's RPC endpoint does not.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub caller: Address,
    /// Native value attached to the call.
    pub value: Wei,
    pub call: Call,
}

impl Transaction {
    pub fn new(caller: Address, call: Call) -> Self {
        Self { caller, value: 0, call }
    }

    pub fn with_value(mut self, value: Wei) -> Self {
        self.value = value;
        self
    }

    /// Canonical bytes (bincode), as carried over RPC.
    pub fn to_bytes(&self) -> Result<Vec<u8>, NuggetError> {
        bincode::serialize(self).map_err(|e| NuggetError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NuggetError> {
        bincode::deserialize(bytes).map_err(|e| NuggetError::Serialization(e.to_string()))
    }
}

// ── Receipt ───────────────────────────────────────────────────────────────────

/// Outcome of a successfully applied transaction. Failed transactions leave
/// no receipt.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    /// Position in the serial execution order.
    pub seq: u64,
    pub caller: Address,
    pub applied_at: Timestamp,
    pub events: Vec<Event>,
}
