use serde::{Deserialize, Serialize};

use crate::constants::{
    FEE_DENOMINATOR, MAX_SUPPLY, RESERVED_FIRST_ID, RESERVED_LAST_ID, ROYALTY_FEE_BPS,
    STANDARD_PRICE_WEI, TOKEN_URI_SUFFIX, WHITELIST_PRICE_WEI,
};
use crate::error::NuggetError;
use crate::types::{Address, Hash32, Timestamp, TokenId, Wei};

// ── ReservedRange ─────────────────────────────────────────────────────────────

/// Contiguous id interval minted to the deployer at construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservedRange {
    pub first: TokenId,
    pub last: TokenId,
}

impl ReservedRange {
    pub fn ids(&self) -> impl Iterator<Item = TokenId> {
        self.first..=self.last
    }

    pub fn len(&self) -> u64 {
        if self.last < self.first {
            0
        } else {
            self.last - self.first + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReservedRange {
    fn default() -> Self {
        Self { first: RESERVED_FIRST_ID, last: RESERVED_LAST_ID }
    }
}

// ── SaleConfig ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleConfig {
    pub max_supply: u64,
    pub reserved: ReservedRange,
    /// Until this instant (inclusive) only allow-listed buyers may purchase.
    pub deadline: Timestamp,
    pub whitelist_price: Wei,
    pub standard_price: Wei,
    /// Token URI prefix; the id and `.json` are appended.
    pub base_uri: String,
}

impl SaleConfig {
    pub fn new(base_uri: impl Into<String>, deadline: Timestamp) -> Self {
        Self {
            max_supply: MAX_SUPPLY,
            reserved: ReservedRange::default(),
            deadline,
            whitelist_price: WHITELIST_PRICE_WEI,
            standard_price: STANDARD_PRICE_WEI,
            base_uri: base_uri.into(),
        }
    }

    /// `reserved ⊆ [1, max_supply]` and a non-empty id space.
    pub fn validate(&self) -> Result<(), NuggetError> {
        if self.max_supply == 0 {
            return Err(NuggetError::InvalidConfig("max_supply must be positive".into()));
        }
        if !self.reserved.is_empty()
            && (self.reserved.first < 1 || self.reserved.last > self.max_supply)
        {
            return Err(NuggetError::InvalidConfig(format!(
                "reserved range {}..={} not within 1..={}",
                self.reserved.first, self.reserved.last, self.max_supply
            )));
        }
        Ok(())
    }

    pub fn contains(&self, id: TokenId) -> bool {
        (1..=self.max_supply).contains(&id)
    }
}

// ── WhitelistRegistry ─────────────────────────────────────────────────────────

/// Allow-list commitment. Root and pointer are only ever replaced together.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhitelistRegistry {
    pub root: Hash32,
    /// Content-addressed location of the whitelist JSON (e.g. `ipfs://…`).
    pub pointer: String,
}

// ── Collection ────────────────────────────────────────────────────────────────

/// Full sale-side state of one collection as stored in the state DB.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Collection {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    /// Authorized caller for root and wallet replacement.
    pub owner: Address,
    pub config: SaleConfig,
    pub whitelist: WhitelistRegistry,
    pub funding_wallet: Address,
    /// Ids ever minted. Never decreases.
    pub circulating_supply: u64,
}

impl Collection {
    pub fn token_uri(&self, id: TokenId) -> String {
        format!("{}{}{}", self.config.base_uri, id, TOKEN_URI_SUFFIX)
    }

    /// `(recipient, amount)` owed on a secondary sale of any id.
    pub fn royalty_info(&self, _id: TokenId, sale_price: Wei) -> (Address, Wei) {
        let amount = sale_price.saturating_mul(ROYALTY_FEE_BPS) / FEE_DENOMINATOR;
        (self.funding_wallet, amount)
    }

    /// Minted share of max supply as a floored integer percentage.
    pub fn minted_percentage(&self) -> u64 {
        self.circulating_supply.saturating_mul(100) / self.config.max_supply.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(supply: u64) -> Collection {
        Collection {
            address: Address::from_bytes([1; 20]),
            name: "My NFT".into(),
            symbol: "MN".into(),
            owner: Address::from_bytes([2; 20]),
            config: SaleConfig::new("ipfs://base/", 0),
            whitelist: WhitelistRegistry { root: Hash32::ZERO, pointer: String::new() },
            funding_wallet: Address::from_bytes([3; 20]),
            circulating_supply: supply,
        }
    }

    #[test]
    fn token_uri_appends_id_and_suffix() {
        assert_eq!(collection(0).token_uri(1), "ipfs://base/1.json");
    }

    #[test]
    fn royalty_is_five_percent_to_funding_wallet() {
        let c = collection(0);
        let price = 80_000_000_000_000_000u128;
        let (to, amount) = c.royalty_info(1, price);
        assert_eq!(to, c.funding_wallet);
        assert_eq!(amount, price * 500 / 10_000);
        assert_eq!(c.royalty_info(9_999, price), (to, amount));
    }

    #[test]
    fn percentage_floors() {
        assert_eq!(collection(100).minted_percentage(), 0);
        assert_eq!(collection(101).minted_percentage(), 1);
        assert_eq!(collection(10_005).minted_percentage(), 100);
    }

    #[test]
    fn reserved_range_must_fit_supply() {
        let mut cfg = SaleConfig::new("x/", 0);
        assert!(cfg.validate().is_ok());
        cfg.reserved = ReservedRange { first: 10_001, last: 10_006 };
        assert!(matches!(cfg.validate(), Err(NuggetError::InvalidConfig(_))));
        cfg.reserved = ReservedRange { first: 0, last: 2 };
        assert!(cfg.validate().is_err());
        cfg.max_supply = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn id_range_is_one_based() {
        let cfg = SaleConfig::new("x/", 0);
        assert!(!cfg.contains(0));
        assert!(cfg.contains(1));
        assert!(cfg.contains(10_005));
        assert!(!cfg.contains(10_006));
    }
}
