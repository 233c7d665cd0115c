use thiserror::Error;

use crate::types::{Timestamp, TokenId, Wei};

#[derive(Debug, Error)]
pub enum NuggetError {
    // ── Sale errors ──────────────────────────────────────────────────────────
    #[error("token id {0} is outside the collection range")]
    InvalidToken(TokenId),

    #[error("invalid payment: expected {expected} wei, got {got}")]
    InvalidPayment { expected: Wei, got: Wei },

    #[error("unknown token: {0} has not been minted")]
    UnknownToken(TokenId),

    #[error("token {0} already minted")]
    AlreadyMinted(TokenId),

    #[error("public sale opens after {opens_after}; only allow-listed buyers may buy until then")]
    PublicSaleNotOpen { opens_after: Timestamp },

    #[error("bulk purchase requires at least one token id")]
    EmptyBatch,

    #[error("wallet is the zero address")]
    ZeroAddress,

    // ── Ledger errors ────────────────────────────────────────────────────────
    #[error("insufficient balance: need {need} wei, have {have}")]
    InsufficientBalance { need: Wei, have: Wei },

    #[error("caller does not hold token {0}")]
    NotTokenHolder(TokenId),

    #[error("call does not accept value")]
    NonPayable,

    #[error("account lacks the minter role on the reward token")]
    MissingMinterRole,

    // ── Staking errors ───────────────────────────────────────────────────────
    #[error("collection already added to staking")]
    AlreadyAdded,

    #[error("staking not started for this collection")]
    StakingNotStarted,

    #[error("caller is not the depositor of this token")]
    NotOwner,

    #[error("token {0} was not received by the staking contract")]
    NotReceived(TokenId),

    #[error("percentage threshold {0} exceeds 100")]
    InvalidThreshold(u8),

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    // ── Auth / config ────────────────────────────────────────────────────────
    #[error("caller is not authorized for this operation")]
    Unauthorized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("not deployed: {0}")]
    NotDeployed(String),

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}
