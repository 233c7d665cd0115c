use nugget_core::collection::{ReservedRange, SaleConfig};
use nugget_core::constants::{REWARD_TOKEN_NAME, REWARD_TOKEN_SYMBOL, WHITELIST_WINDOW_SECS};
use nugget_core::error::NuggetError;
use nugget_core::types::{Address, Hash32, Timestamp, TokenId, Wei};
use nugget_crypto::WhitelistFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a fresh deployment needs, read from a JSON file.
///
/// Addresses and hashes are `0x`-prefixed hex strings. Omitted sale
/// parameters fall back to the values in `nugget_core::constants`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeployParams {
    /// Owns the collection and the staking contract, administers the reward
    /// token and receives the reserved range.
    pub deployer: String,
    /// Mixed into derived contract addresses.
    #[serde(default)]
    pub salt: String,
    pub collection: CollectionParams,
    #[serde(default)]
    pub reward_token: RewardTokenParams,
    /// Register the collection with staking at this threshold right away.
    #[serde(default)]
    pub staking_threshold: Option<u8>,
    /// Initial native balances.
    #[serde(default)]
    pub balances: Vec<Allocation>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionParams {
    pub name: String,
    pub symbol: String,
    pub base_uri: String,
    /// Where the whitelist JSON lives, e.g. `ipfs://<cid>`.
    pub whitelist_pointer: String,
    /// Explicit root. When absent the root is built from `whitelist_addresses`.
    #[serde(default)]
    pub whitelist_root: Option<String>,
    #[serde(default)]
    pub whitelist_addresses: Vec<String>,
    pub funding_wallet: String,
    /// Absolute deadline; defaults to deployment time plus one day.
    #[serde(default)]
    pub deadline: Option<Timestamp>,
    #[serde(default)]
    pub max_supply: Option<u64>,
    #[serde(default)]
    pub reserved: Option<(TokenId, TokenId)>,
    #[serde(default)]
    pub whitelist_price: Option<Wei>,
    #[serde(default)]
    pub standard_price: Option<Wei>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardTokenParams {
    pub name: String,
    pub symbol: String,
}

impl Default for RewardTokenParams {
    fn default() -> Self {
        Self {
            name: REWARD_TOKEN_NAME.into(),
            symbol: REWARD_TOKEN_SYMBOL.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Allocation {
    pub address: String,
    pub amount: Wei,
}

impl DeployParams {
    pub fn from_json(json: &str) -> Result<Self, NuggetError> {
        serde_json::from_str(json).map_err(|e| NuggetError::Serialization(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NuggetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| NuggetError::Storage(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn deployer(&self) -> Result<Address, NuggetError> {
        self.deployer.parse()
    }
}

impl CollectionParams {
    pub fn funding_wallet(&self) -> Result<Address, NuggetError> {
        self.funding_wallet.parse()
    }

    pub fn whitelist_root(&self) -> Result<Hash32, NuggetError> {
        match &self.whitelist_root {
            Some(root) => root.parse(),
            None => {
                let file = WhitelistFile { addresses: self.whitelist_addresses.clone() };
                Ok(file.tree()?.root())
            }
        }
    }

    /// Sale configuration with defaults filled in.
    pub fn sale_config(&self, now: Timestamp) -> SaleConfig {
        let mut config = SaleConfig::new(
            self.base_uri.clone(),
            self.deadline.unwrap_or(now + WHITELIST_WINDOW_SECS),
        );
        if let Some(max) = self.max_supply {
            config.max_supply = max;
        }
        if let Some((first, last)) = self.reserved {
            config.reserved = ReservedRange { first, last };
        }
        if let Some(price) = self.whitelist_price {
            config.whitelist_price = price;
        }
        if let Some(price) = self.standard_price {
            config.standard_price = price;
        }
        config
    }
}

impl Allocation {
    pub fn address(&self) -> Result<Address, NuggetError> {
        self.address.parse()
    }
}
