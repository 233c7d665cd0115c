use nugget_core::collection::Collection;
use nugget_core::error::NuggetError;
use nugget_core::staking::{NftInfo, RewardToken, StakeInfo, StakingContract};
use nugget_core::transaction::Receipt;
use nugget_core::types::{Address, TokenId, Wei};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{TransactionError, Transactional};
use std::path::Path;

const META_STAKING: &str = "staking";
const META_REWARD_TOKEN: &str = "reward_token";
const META_TX_SEQ: &str = "tx_seq";

/// Persistent state database backed by sled (pure-Rust, no C dependencies).
///
/// Named trees (analogous to column families):
///   meta         — utf8 key bytes          → raw bytes / bincode
///   collections  — Address bytes           → bincode(Collection)
///   tokens       — collection ‖ id (be)    → owner Address bytes
///   balances     — Address bytes           → native balance (u128 be)
///   rewards      — Address bytes           → reward-token balance (u128 be)
///   nft_info     — collection bytes        → bincode(NftInfo)
///   stakes       — depositor bytes         → bincode(StakeInfo)
///   custody      — collection ‖ id (be)    → depositor Address bytes
///   receipts     — seq (be)                → bincode(Receipt)
///
/// All writes go through [`StateBatch`] and land in one multi-tree sled
/// transaction, so readers never see a transaction half applied.
pub struct StateDb {
    _db: sled::Db,
    meta: sled::Tree,
    collections: sled::Tree,
    tokens: sled::Tree,
    balances: sled::Tree,
    rewards: sled::Tree,
    nft_info: sled::Tree,
    stakes: sled::Tree,
    custody: sled::Tree,
    receipts: sled::Tree,
}

fn storage(e: sled::Error) -> NuggetError {
    NuggetError::Storage(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, NuggetError> {
    bincode::serialize(value).map_err(|e| NuggetError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, NuggetError> {
    bincode::deserialize(bytes).map_err(|e| NuggetError::Serialization(e.to_string()))
}

fn token_key(collection: &Address, id: TokenId) -> [u8; 28] {
    let mut key = [0u8; 28];
    key[..20].copy_from_slice(collection.as_bytes());
    key[20..].copy_from_slice(&id.to_be_bytes());
    key
}

fn address_from(bytes: &[u8]) -> Result<Address, NuggetError> {
    let arr: [u8; 20] = bytes
        .try_into()
        .map_err(|_| NuggetError::Serialization(format!("address of {} bytes", bytes.len())))?;
    Ok(Address::from_bytes(arr))
}

fn amount_from(bytes: &[u8]) -> Result<Wei, NuggetError> {
    let arr: [u8; 16] = bytes
        .try_into()
        .map_err(|_| NuggetError::Serialization(format!("amount of {} bytes", bytes.len())))?;
    Ok(Wei::from_be_bytes(arr))
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, NuggetError> {
        let db = sled::open(path).map_err(storage)?;
        let meta        = db.open_tree("meta").map_err(storage)?;
        let collections = db.open_tree("collections").map_err(storage)?;
        let tokens      = db.open_tree("tokens").map_err(storage)?;
        let balances    = db.open_tree("balances").map_err(storage)?;
        let rewards     = db.open_tree("rewards").map_err(storage)?;
        let nft_info    = db.open_tree("nft_info").map_err(storage)?;
        let stakes      = db.open_tree("stakes").map_err(storage)?;
        let custody     = db.open_tree("custody").map_err(storage)?;
        let receipts    = db.open_tree("receipts").map_err(storage)?;
        Ok(Self {
            _db: db,
            meta,
            collections,
            tokens,
            balances,
            rewards,
            nft_info,
            stakes,
            custody,
            receipts,
        })
    }

    fn get_decoded<T: DeserializeOwned>(
        tree: &sled::Tree,
        key: &[u8],
    ) -> Result<Option<T>, NuggetError> {
        match tree.get(key).map_err(storage)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Collections ──────────────────────────────────────────────────────────

    pub fn get_collection(&self, address: &Address) -> Result<Option<Collection>, NuggetError> {
        Self::get_decoded(&self.collections, address.as_bytes())
    }

    // ── Token ownership ──────────────────────────────────────────────────────

    pub fn get_token_owner(
        &self,
        collection: &Address,
        id: TokenId,
    ) -> Result<Option<Address>, NuggetError> {
        match self.tokens.get(token_key(collection, id)).map_err(storage)? {
            Some(bytes) => Ok(Some(address_from(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Native balances ──────────────────────────────────────────────────────

    pub fn get_balance(&self, account: &Address) -> Result<Wei, NuggetError> {
        match self.balances.get(account.as_bytes()).map_err(storage)? {
            Some(bytes) => amount_from(&bytes),
            None => Ok(0),
        }
    }

    // ── Reward-token balances ────────────────────────────────────────────────

    pub fn get_reward_balance(&self, account: &Address) -> Result<Wei, NuggetError> {
        match self.rewards.get(account.as_bytes()).map_err(storage)? {
            Some(bytes) => amount_from(&bytes),
            None => Ok(0),
        }
    }

    // ── Staking ──────────────────────────────────────────────────────────────

    pub fn get_nft_info(&self, collection: &Address) -> Result<Option<NftInfo>, NuggetError> {
        Self::get_decoded(&self.nft_info, collection.as_bytes())
    }

    pub fn get_stake(&self, depositor: &Address) -> Result<Option<StakeInfo>, NuggetError> {
        Self::get_decoded(&self.stakes, depositor.as_bytes())
    }

    pub fn get_custody(
        &self,
        collection: &Address,
        id: TokenId,
    ) -> Result<Option<Address>, NuggetError> {
        match self.custody.get(token_key(collection, id)).map_err(storage)? {
            Some(bytes) => Ok(Some(address_from(&bytes)?)),
            None => Ok(None),
        }
    }

    // ── Singletons ───────────────────────────────────────────────────────────

    pub fn get_staking(&self) -> Result<Option<StakingContract>, NuggetError> {
        Self::get_decoded(&self.meta, META_STAKING.as_bytes())
    }

    pub fn get_reward_token(&self) -> Result<Option<RewardToken>, NuggetError> {
        Self::get_decoded(&self.meta, META_REWARD_TOKEN.as_bytes())
    }

    // ── Receipts ─────────────────────────────────────────────────────────────

    /// Sequence number the next receipt will carry.
    pub fn next_seq(&self) -> Result<u64, NuggetError> {
        match self.meta.get(META_TX_SEQ.as_bytes()).map_err(storage)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .as_ref()
                    .try_into()
                    .map_err(|_| NuggetError::Serialization("tx_seq".into()))?;
                Ok(u64::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    pub fn get_receipt(&self, seq: u64) -> Result<Option<Receipt>, NuggetError> {
        Self::get_decoded(&self.receipts, &seq.to_be_bytes())
    }

    /// Most recent receipts, newest first.
    pub fn recent_receipts(&self, limit: usize) -> Result<Vec<Receipt>, NuggetError> {
        let mut out = Vec::new();
        for item in self.receipts.iter().rev().take(limit) {
            let (_, bytes) = item.map_err(storage)?;
            out.push(decode(&bytes)?);
        }
        Ok(out)
    }

    /// Apply every write of `batch` in one sled transaction across all trees.
    pub fn commit(&self, batch: &StateBatch) -> Result<(), NuggetError> {
        let trees = (
            &self.meta,
            &self.collections,
            &self.tokens,
            &self.balances,
            &self.rewards,
            &self.nft_info,
            &self.stakes,
            &self.custody,
            &self.receipts,
        );
        let outcome: Result<(), TransactionError<()>> = trees.transaction(
            |(meta, collections, tokens, balances, rewards, nft_info, stakes, custody, receipts)| {
                meta.apply_batch(&batch.meta)?;
                collections.apply_batch(&batch.collections)?;
                tokens.apply_batch(&batch.tokens)?;
                balances.apply_batch(&batch.balances)?;
                rewards.apply_batch(&batch.rewards)?;
                nft_info.apply_batch(&batch.nft_info)?;
                stakes.apply_batch(&batch.stakes)?;
                custody.apply_batch(&batch.custody)?;
                receipts.apply_batch(&batch.receipts)?;
                Ok(())
            },
        );
        match outcome {
            Ok(()) => Ok(()),
            Err(TransactionError::Storage(e)) => Err(storage(e)),
            Err(TransactionError::Abort(())) => Err(NuggetError::Storage("commit aborted".into())),
        }
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), NuggetError> {
        self._db.flush().map_err(storage)?;
        Ok(())
    }
}

// ── StateBatch ────────────────────────────────────────────────────────────────

/// Pending writes of one transaction, grouped by tree. Nothing is visible
/// until [`StateDb::commit`].
#[derive(Default)]
pub struct StateBatch {
    meta: sled::Batch,
    collections: sled::Batch,
    tokens: sled::Batch,
    balances: sled::Batch,
    rewards: sled::Batch,
    nft_info: sled::Batch,
    stakes: sled::Batch,
    custody: sled::Batch,
    receipts: sled::Batch,
}

impl StateBatch {
    pub fn put_collection(&mut self, collection: &Collection) -> Result<(), NuggetError> {
        self.collections.insert(&collection.address.as_bytes()[..], encode(collection)?);
        Ok(())
    }

    pub fn put_token_owner(&mut self, collection: &Address, id: TokenId, owner: &Address) {
        self.tokens.insert(&token_key(collection, id)[..], &owner.as_bytes()[..]);
    }

    pub fn put_balance(&mut self, account: &Address, amount: Wei) {
        self.balances.insert(&account.as_bytes()[..], &amount.to_be_bytes()[..]);
    }

    pub fn put_reward_balance(&mut self, account: &Address, amount: Wei) {
        self.rewards.insert(&account.as_bytes()[..], &amount.to_be_bytes()[..]);
    }

    pub fn put_nft_info(&mut self, collection: &Address, info: &NftInfo) -> Result<(), NuggetError> {
        self.nft_info.insert(&collection.as_bytes()[..], encode(info)?);
        Ok(())
    }

    pub fn put_stake(&mut self, depositor: &Address, stake: &StakeInfo) -> Result<(), NuggetError> {
        self.stakes.insert(&depositor.as_bytes()[..], encode(stake)?);
        Ok(())
    }

    pub fn put_custody(&mut self, collection: &Address, id: TokenId, depositor: &Address) {
        self.custody.insert(&token_key(collection, id)[..], &depositor.as_bytes()[..]);
    }

    pub fn remove_custody(&mut self, collection: &Address, id: TokenId) {
        self.custody.remove(&token_key(collection, id)[..]);
    }

    pub fn put_staking(&mut self, staking: &StakingContract) -> Result<(), NuggetError> {
        self.meta.insert(META_STAKING.as_bytes(), encode(staking)?);
        Ok(())
    }

    pub fn put_reward_token(&mut self, token: &RewardToken) -> Result<(), NuggetError> {
        self.meta.insert(META_REWARD_TOKEN.as_bytes(), encode(token)?);
        Ok(())
    }

    /// Store `receipt` and advance the sequence counter past it.
    pub fn put_receipt(&mut self, receipt: &Receipt) -> Result<(), NuggetError> {
        self.receipts.insert(&receipt.seq.to_be_bytes()[..], encode(receipt)?);
        self.meta.insert(META_TX_SEQ.as_bytes(), &(receipt.seq + 1).to_be_bytes()[..]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nugget_core::staking::NftStatus;

    fn temp_db(name: &str) -> StateDb {
        let dir = std::env::temp_dir().join(format!("nugget_db_test_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        StateDb::open(&dir).expect("open temp db")
    }

    fn commit_with(db: &StateDb, fill: impl FnOnce(&mut StateBatch)) {
        let mut batch = StateBatch::default();
        fill(&mut batch);
        db.commit(&batch).unwrap();
    }

    #[test]
    fn missing_balances_read_as_zero() {
        let db = temp_db("zero_bal");
        let a = Address::from_bytes([1; 20]);
        assert_eq!(db.get_balance(&a).unwrap(), 0);
        assert_eq!(db.get_reward_balance(&a).unwrap(), 0);
        commit_with(&db, |b| b.put_balance(&a, u128::MAX));
        assert_eq!(db.get_balance(&a).unwrap(), u128::MAX);
    }

    #[test]
    fn token_keys_do_not_collide_across_collections() {
        let db = temp_db("token_keys");
        let (c1, c2) = (Address::from_bytes([1; 20]), Address::from_bytes([2; 20]));
        let owner = Address::from_bytes([9; 20]);
        commit_with(&db, |b| b.put_token_owner(&c1, 7, &owner));
        assert_eq!(db.get_token_owner(&c1, 7).unwrap(), Some(owner));
        assert_eq!(db.get_token_owner(&c2, 7).unwrap(), None);
        assert_eq!(db.get_token_owner(&c1, 8).unwrap(), None);
    }

    #[test]
    fn custody_removal() {
        let db = temp_db("custody");
        let c = Address::from_bytes([1; 20]);
        let d = Address::from_bytes([2; 20]);
        commit_with(&db, |b| b.put_custody(&c, 1, &d));
        assert_eq!(db.get_custody(&c, 1).unwrap(), Some(d));
        commit_with(&db, |b| b.remove_custody(&c, 1));
        assert_eq!(db.get_custody(&c, 1).unwrap(), None);
    }

    #[test]
    fn nft_info_round_trips() {
        let db = temp_db("nft_info");
        let c = Address::from_bytes([1; 20]);
        let info = NftInfo { percentage_threshold: 1, status: NftStatus::PendingThreshold };
        commit_with(&db, |b| b.put_nft_info(&c, &info).unwrap());
        assert_eq!(db.get_nft_info(&c).unwrap(), Some(info));
    }

    #[test]
    fn receipts_advance_sequence() {
        let db = temp_db("receipts");
        assert_eq!(db.next_seq().unwrap(), 0);
        for seq in 0..3 {
            let receipt = Receipt {
                seq,
                caller: Address::ZERO,
                applied_at: seq as i64,
                events: vec![],
            };
            commit_with(&db, |b| b.put_receipt(&receipt).unwrap());
        }
        assert_eq!(db.next_seq().unwrap(), 3);
        let recent = db.recent_receipts(2).unwrap();
        assert_eq!(recent.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn uncommitted_batch_is_invisible() {
        let db = temp_db("uncommitted");
        let a = Address::from_bytes([1; 20]);
        let mut batch = StateBatch::default();
        batch.put_balance(&a, 5);
        batch.put_token_owner(&a, 1, &a);
        assert_eq!(db.get_balance(&a).unwrap(), 0);
        db.commit(&batch).unwrap();
        assert_eq!(db.get_balance(&a).unwrap(), 5);
        assert_eq!(db.get_token_owner(&a, 1).unwrap(), Some(a));
    }
}
