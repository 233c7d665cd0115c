use nugget_core::collection::Collection;
use nugget_core::error::NuggetError;
use nugget_core::staking::{NftInfo, StakeInfo};
use nugget_core::types::{Address, Hash32, Timestamp, TokenId, Wei};

use crate::db::StateDb;
use crate::{pricing, staking};

// ── SaleQuery ─────────────────────────────────────────────────────────────────

/// Read-only view of one collection's sale state.
pub struct SaleQuery<'a> {
    db: &'a StateDb,
    collection: Collection,
}

impl<'a> SaleQuery<'a> {
    pub fn new(db: &'a StateDb, collection: &Address) -> Result<Self, NuggetError> {
        let collection = db
            .get_collection(collection)?
            .ok_or_else(|| NuggetError::UnknownCollection(collection.to_hex()))?;
        Ok(Self { db, collection })
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn price_for(&self, proof: &[Hash32], claimant: &Address) -> Wei {
        pricing::price_for(&self.collection, proof, claimant)
    }

    pub fn is_whitelisted(&self, proof: &[Hash32], claimant: &Address) -> bool {
        pricing::is_whitelisted(&self.collection, proof, claimant)
    }

    pub fn exists(&self, id: TokenId) -> Result<bool, NuggetError> {
        Ok(self.owner_of(id)?.is_some())
    }

    pub fn owner_of(&self, id: TokenId) -> Result<Option<Address>, NuggetError> {
        self.db.get_token_owner(&self.collection.address, id)
    }

    pub fn token_uri(&self, id: TokenId) -> Result<String, NuggetError> {
        if !self.exists(id)? {
            return Err(NuggetError::UnknownToken(id));
        }
        Ok(self.collection.token_uri(id))
    }

    pub fn max_supply(&self) -> u64 {
        self.collection.config.max_supply
    }

    pub fn circulating_supply(&self) -> u64 {
        self.collection.circulating_supply
    }

    pub fn merkle_root(&self) -> Hash32 {
        self.collection.whitelist.root
    }

    pub fn whitelist_pointer(&self) -> &str {
        &self.collection.whitelist.pointer
    }

    pub fn funding_wallet(&self) -> Address {
        self.collection.funding_wallet
    }

    pub fn royalty_info(&self, id: TokenId, sale_price: Wei) -> (Address, Wei) {
        self.collection.royalty_info(id, sale_price)
    }
}

// ── StakingQuery ──────────────────────────────────────────────────────────────

pub struct StakingQuery<'a> {
    db: &'a StateDb,
}

impl<'a> StakingQuery<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn is_active(&self, collection: &Address) -> Result<bool, NuggetError> {
        let (Some(c), Some(info)) = (self.db.get_collection(collection)?, self.db.get_nft_info(collection)?)
        else {
            return Ok(false);
        };
        Ok(staking::is_active(&c, &info))
    }

    pub fn nft_info(&self, collection: &Address) -> Result<NftInfo, NuggetError> {
        Ok(self.db.get_nft_info(collection)?.unwrap_or_default())
    }

    pub fn stake_info(&self, depositor: &Address) -> Result<StakeInfo, NuggetError> {
        Ok(self.db.get_stake(depositor)?.unwrap_or_default())
    }

    /// Reward a claim at `now` would mint.
    pub fn pending_reward(&self, depositor: &Address, now: Timestamp) -> Result<Wei, NuggetError> {
        staking::pending_reward(&self.stake_info(depositor)?, now)
    }

    /// Depositor of a token in custody, or the null address.
    pub fn token_owner(&self, collection: &Address, id: TokenId) -> Result<Address, NuggetError> {
        Ok(self.db.get_custody(collection, id)?.unwrap_or(Address::ZERO))
    }

    pub fn reward_balance(&self, account: &Address) -> Result<Wei, NuggetError> {
        self.db.get_reward_balance(account)
    }

    pub fn balance(&self, account: &Address) -> Result<Wei, NuggetError> {
        self.db.get_balance(account)
    }
}
