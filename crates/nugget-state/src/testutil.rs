//! Shared fixture for engine and query tests.

use std::ops::RangeInclusive;
use std::sync::Arc;

use nugget_core::collection::{Collection, SaleConfig, WhitelistRegistry};
use nugget_core::constants::{WEI_PER_UNIT, WHITELIST_PRICE_WEI};
use nugget_core::error::NuggetError;
use nugget_core::staking::{RewardToken, StakingContract};
use nugget_core::transaction::{Call, Receipt, Transaction};
use nugget_core::types::{Address, Hash32, Timestamp, TokenId, Wei};
use nugget_crypto::MerkleTree;

use crate::db::StateDb;
use crate::engine::StateEngine;
use crate::ledger::grant_minter_role;
use crate::{sale, staking};

pub const NOW: Timestamp = 1_700_000_000;
pub const DEADLINE: Timestamp = NOW + 86_400;

pub fn addr(b: u8) -> Address {
    Address::from_bytes([b; 20])
}

/// Collection owner, staking owner and reward-token admin.
pub fn owner() -> Address {
    addr(0x01)
}

pub fn funding() -> Address {
    addr(0xF0)
}

pub fn collection_addr() -> Address {
    addr(0xC0)
}

pub fn staking_addr() -> Address {
    addr(0x5A)
}

pub fn reward_addr() -> Address {
    addr(0x6E)
}

/// Allow-listed accounts `0..3`.
pub fn member(i: u8) -> Address {
    addr(0xA1 + i)
}

pub fn outsider() -> Address {
    addr(0xB0)
}

pub struct Fixture {
    pub engine: StateEngine,
    pub tree: MerkleTree,
}

impl Fixture {
    /// Collection, staking and reward token deployed; staking may mint;
    /// the collection is not yet registered with staking.
    pub fn new(name: &str) -> Self {
        Self::build(name, true)
    }

    /// 101 ids minted and the collection registered at a 1% threshold.
    /// `member(0)` holds ids 1..=96.
    pub fn active(name: &str) -> Self {
        let f = Self::build(name, true);
        f.activate();
        f
    }

    pub fn active_without_minter(name: &str) -> Self {
        let f = Self::build(name, false);
        f.activate();
        f
    }

    fn build(name: &str, grant_minter: bool) -> Self {
        let dir = std::env::temp_dir().join(format!("nugget_state_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        let db = StateDb::open(&dir).expect("open temp db");

        let members: Vec<Address> = (0..3).map(member).collect();
        let tree = MerkleTree::from_addresses(&members);
        let collection = Collection {
            address: collection_addr(),
            name: "Nugget".into(),
            symbol: "NUG".into(),
            owner: owner(),
            config: SaleConfig::new("ipfs://meta/", DEADLINE),
            whitelist: WhitelistRegistry { root: tree.root(), pointer: "ipfs://list".into() },
            funding_wallet: funding(),
            circulating_supply: 0,
        };
        let staking = StakingContract {
            address: staking_addr(),
            owner: owner(),
            reward_token: reward_addr(),
        };
        let token = RewardToken {
            address: reward_addr(),
            name: "GoldenNugget".into(),
            symbol: "GN".into(),
            admin: owner(),
            minters: vec![],
            total_supply: 0,
        };

        let engine = StateEngine::new(Arc::new(db));
        engine
            .execute(owner(), NOW, |s| {
                for who in (0..3).map(member).chain([outsider()]) {
                    s.set_balance(&who, 10 * WEI_PER_UNIT);
                }
                sale::deploy_collection(s, collection)?;
                staking::deploy_staking(s, staking, token)?;
                if grant_minter {
                    grant_minter_role(s, &owner(), &staking_addr())?;
                }
                Ok(())
            })
            .expect("deploy fixture");
        Self { engine, tree }
    }

    fn activate(&self) {
        self.buy_range(member(0), 1..=96).expect("reach threshold");
        self.apply(
            owner(),
            0,
            Call::AddNft { collection: collection_addr(), percentage_threshold: 1 },
            NOW,
        )
        .expect("register collection");
    }

    pub fn db(&self) -> &StateDb {
        &self.engine.db
    }

    pub fn proof(&self, who: &Address) -> Vec<Hash32> {
        self.tree.proof_for(who).unwrap_or_default()
    }

    pub fn apply(&self, caller: Address, value: Wei, call: Call, now: Timestamp) -> Result<Receipt, NuggetError> {
        let tx = Transaction::new(caller, call).with_value(value);
        self.engine.apply(&tx, now)
    }

    /// Bulk-buy `ids` at the allow-list price before the deadline.
    pub fn buy_range(&self, who: Address, ids: RangeInclusive<TokenId>) -> Result<Receipt, NuggetError> {
        let token_ids: Vec<TokenId> = ids.collect();
        let value = WHITELIST_PRICE_WEI * token_ids.len() as u128;
        let call = Call::BuyBulk { collection: collection_addr(), proof: self.proof(&who), token_ids };
        self.apply(who, value, call, NOW)
    }

    /// Transfer `id` to the staking contract.
    pub fn deposit(&self, who: Address, id: TokenId, now: Timestamp) -> Result<Receipt, NuggetError> {
        let call = Call::TransferNft { collection: collection_addr(), to: staking_addr(), token_id: id };
        self.apply(who, 0, call, now)
    }

    pub fn supply(&self) -> u64 {
        self.db()
            .get_collection(&collection_addr())
            .expect("read collection")
            .map(|c| c.circulating_supply)
            .unwrap_or(0)
    }
}
