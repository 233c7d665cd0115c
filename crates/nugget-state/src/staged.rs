use std::collections::HashMap;

use nugget_core::collection::Collection;
use nugget_core::error::NuggetError;
use nugget_core::event::Event;
use nugget_core::staking::{NftInfo, RewardToken, StakeInfo, StakingContract};
use nugget_core::transaction::Receipt;
use nugget_core::types::{Address, Timestamp, TokenId, Wei};

use crate::db::{StateBatch, StateDb};

/// Copy-on-write view over the state DB for one transaction.
///
/// Reads fall through to the DB until a key has been written here. Nothing
/// reaches the DB before `commit`; dropping the view discards every change
/// and every event.
pub struct StagedState<'a> {
    db: &'a StateDb,
    collections: HashMap<Address, Collection>,
    tokens: HashMap<(Address, TokenId), Address>,
    balances: HashMap<Address, Wei>,
    rewards: HashMap<Address, Wei>,
    nft_info: HashMap<Address, NftInfo>,
    stakes: HashMap<Address, StakeInfo>,
    /// `None` marks a removed custody entry.
    custody: HashMap<(Address, TokenId), Option<Address>>,
    staking: Option<StakingContract>,
    reward_token: Option<RewardToken>,
    events: Vec<Event>,
}

impl<'a> StagedState<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self {
            db,
            collections: HashMap::new(),
            tokens: HashMap::new(),
            balances: HashMap::new(),
            rewards: HashMap::new(),
            nft_info: HashMap::new(),
            stakes: HashMap::new(),
            custody: HashMap::new(),
            staking: None,
            reward_token: None,
            events: Vec::new(),
        }
    }

    // ── Collections ──────────────────────────────────────────────────────────

    pub fn find_collection(&self, address: &Address) -> Result<Option<Collection>, NuggetError> {
        match self.collections.get(address) {
            Some(c) => Ok(Some(c.clone())),
            None => self.db.get_collection(address),
        }
    }

    pub fn collection(&self, address: &Address) -> Result<Collection, NuggetError> {
        self.find_collection(address)?
            .ok_or_else(|| NuggetError::UnknownCollection(address.to_hex()))
    }

    pub fn put_collection(&mut self, collection: Collection) {
        self.collections.insert(collection.address, collection);
    }

    // ── Token ownership ──────────────────────────────────────────────────────

    pub fn token_owner(&self, collection: &Address, id: TokenId) -> Result<Option<Address>, NuggetError> {
        match self.tokens.get(&(*collection, id)) {
            Some(owner) => Ok(Some(*owner)),
            None => self.db.get_token_owner(collection, id),
        }
    }

    pub fn set_token_owner(&mut self, collection: &Address, id: TokenId, owner: Address) {
        self.tokens.insert((*collection, id), owner);
    }

    // ── Balances ─────────────────────────────────────────────────────────────

    pub fn balance(&self, account: &Address) -> Result<Wei, NuggetError> {
        match self.balances.get(account) {
            Some(b) => Ok(*b),
            None => self.db.get_balance(account),
        }
    }

    pub fn set_balance(&mut self, account: &Address, amount: Wei) {
        self.balances.insert(*account, amount);
    }

    pub fn reward_balance(&self, account: &Address) -> Result<Wei, NuggetError> {
        match self.rewards.get(account) {
            Some(b) => Ok(*b),
            None => self.db.get_reward_balance(account),
        }
    }

    pub fn set_reward_balance(&mut self, account: &Address, amount: Wei) {
        self.rewards.insert(*account, amount);
    }

    // ── Staking state ────────────────────────────────────────────────────────

    pub fn nft_info(&self, collection: &Address) -> Result<Option<NftInfo>, NuggetError> {
        match self.nft_info.get(collection) {
            Some(info) => Ok(Some(*info)),
            None => self.db.get_nft_info(collection),
        }
    }

    pub fn put_nft_info(&mut self, collection: &Address, info: NftInfo) {
        self.nft_info.insert(*collection, info);
    }

    pub fn stake(&self, depositor: &Address) -> Result<Option<StakeInfo>, NuggetError> {
        match self.stakes.get(depositor) {
            Some(s) => Ok(Some(*s)),
            None => self.db.get_stake(depositor),
        }
    }

    pub fn put_stake(&mut self, depositor: &Address, stake: StakeInfo) {
        self.stakes.insert(*depositor, stake);
    }

    pub fn custody(&self, collection: &Address, id: TokenId) -> Result<Option<Address>, NuggetError> {
        match self.custody.get(&(*collection, id)) {
            Some(entry) => Ok(*entry),
            None => self.db.get_custody(collection, id),
        }
    }

    pub fn set_custody(&mut self, collection: &Address, id: TokenId, depositor: Option<Address>) {
        self.custody.insert((*collection, id), depositor);
    }

    // ── Singletons ───────────────────────────────────────────────────────────

    pub fn staking(&self) -> Result<StakingContract, NuggetError> {
        match &self.staking {
            Some(s) => Ok(s.clone()),
            None => self
                .db
                .get_staking()?
                .ok_or_else(|| NuggetError::NotDeployed("staking".into())),
        }
    }

    /// Staking address if a staking contract exists.
    pub fn staking_address(&self) -> Result<Option<Address>, NuggetError> {
        match &self.staking {
            Some(s) => Ok(Some(s.address)),
            None => Ok(self.db.get_staking()?.map(|s| s.address)),
        }
    }

    pub fn put_staking(&mut self, staking: StakingContract) {
        self.staking = Some(staking);
    }

    pub fn reward_token(&self) -> Result<RewardToken, NuggetError> {
        match &self.reward_token {
            Some(t) => Ok(t.clone()),
            None => self
                .db
                .get_reward_token()?
                .ok_or_else(|| NuggetError::NotDeployed("reward token".into())),
        }
    }

    pub fn put_reward_token(&mut self, token: RewardToken) {
        self.reward_token = Some(token);
    }

    // ── Events ───────────────────────────────────────────────────────────────

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    // ── Commit ───────────────────────────────────────────────────────────────

    /// Write every staged change, the receipt and the advanced sequence
    /// counter to the DB as one atomic batch.
    pub fn commit(self, caller: Address, applied_at: Timestamp) -> Result<Receipt, NuggetError> {
        let mut batch = StateBatch::default();
        for c in self.collections.values() {
            batch.put_collection(c)?;
        }
        for ((collection, id), owner) in &self.tokens {
            batch.put_token_owner(collection, *id, owner);
        }
        for (account, amount) in &self.balances {
            batch.put_balance(account, *amount);
        }
        for (account, amount) in &self.rewards {
            batch.put_reward_balance(account, *amount);
        }
        for (collection, info) in &self.nft_info {
            batch.put_nft_info(collection, info)?;
        }
        for (depositor, stake) in &self.stakes {
            batch.put_stake(depositor, stake)?;
        }
        for ((collection, id), entry) in &self.custody {
            match entry {
                Some(depositor) => batch.put_custody(collection, *id, depositor),
                None => batch.remove_custody(collection, *id),
            }
        }
        if let Some(s) = &self.staking {
            batch.put_staking(s)?;
        }
        if let Some(t) = &self.reward_token {
            batch.put_reward_token(t)?;
        }

        let receipt = Receipt {
            seq: self.db.next_seq()?,
            caller,
            applied_at,
            events: self.events,
        };
        batch.put_receipt(&receipt)?;
        self.db.commit(&batch)?;
        Ok(receipt)
    }
}
