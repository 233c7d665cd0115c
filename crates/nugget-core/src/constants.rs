/// ─── Nugget Protocol Constants ──────────────────────────────────────────────
///
/// Collection: fixed supply, allow-list priced, reserved tail pre-minted.
/// Reward:     GoldenNugget (GN), 18 decimals, minted by staking only.

// ── Units ────────────────────────────────────────────────────────────────────

/// One whole native coin / reward token in base units (18 decimals).
pub const WEI_PER_UNIT: u128 = 1_000_000_000_000_000_000;

// ── Collection supply ────────────────────────────────────────────────────────

/// Default maximum number of ids. Valid ids are `1..=MAX_SUPPLY`.
pub const MAX_SUPPLY: u64 = 10_005;

/// First id of the range pre-minted to the deployer.
pub const RESERVED_FIRST_ID: u64 = 10_001;

/// Last id of the range pre-minted to the deployer.
pub const RESERVED_LAST_ID: u64 = 10_005;

// ── Pricing ──────────────────────────────────────────────────────────────────

/// Allow-listed unit price: 0.06 coin.
pub const WHITELIST_PRICE_WEI: u128 = 60_000_000_000_000_000;

/// General unit price: 0.08 coin.
pub const STANDARD_PRICE_WEI: u128 = 80_000_000_000_000_000;

/// Default length of the allow-list-only window after deployment (1 day).
pub const WHITELIST_WINDOW_SECS: i64 = 86_400;

// ── Royalty ──────────────────────────────────────────────────────────────────

/// Royalty on secondary sales, in basis points (5%).
pub const ROYALTY_FEE_BPS: u128 = 500;

pub const FEE_DENOMINATOR: u128 = 10_000;

// ── Metadata ─────────────────────────────────────────────────────────────────

/// Appended to `base_uri + id` when resolving a token URI.
pub const TOKEN_URI_SUFFIX: &str = ".json";

// ── Staking ──────────────────────────────────────────────────────────────────

/// Reward units minted per staked token per second.
pub const REWARD_RATE_PER_TOKEN_SEC: u128 = 1_653_439_153_935;

/// Upper bound of `percentage_threshold`.
pub const MAX_PERCENTAGE_THRESHOLD: u8 = 100;

pub const REWARD_TOKEN_NAME: &str = "GoldenNugget";
pub const REWARD_TOKEN_SYMBOL: &str = "GN";
