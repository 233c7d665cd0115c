use std::sync::{Arc, Mutex};

use nugget_core::error::NuggetError;
use nugget_core::transaction::{Call, Receipt, Transaction};
use nugget_core::types::{Address, Timestamp, TokenId};
use tracing::{debug, info, warn};

use crate::db::StateDb;
use crate::ledger::{grant_minter_role, AssetLedger};
use crate::staged::StagedState;
use crate::{sale, staking};

// ── StateEngine ───────────────────────────────────────────────────────────────

/// The state transition engine.
///
/// Transactions run one at a time against a `StagedState`. A call that
/// returns an error leaves the database exactly as it was: no partial mints,
/// payments, settlements or events.
pub struct StateEngine {
    pub db: Arc<StateDb>,
    apply_lock: Mutex<()>,
}

impl StateEngine {
    pub fn new(db: Arc<StateDb>) -> Self {
        Self { db, apply_lock: Mutex::new(()) }
    }

    /// Run `f` against a fresh staged view and commit it if `f` succeeds.
    /// Used by `apply` and by deployment.
    pub fn execute<F>(&self, caller: Address, now: Timestamp, f: F) -> Result<Receipt, NuggetError>
    where
        F: FnOnce(&mut StagedState<'_>) -> Result<(), NuggetError>,
    {
        let _serial = self
            .apply_lock
            .lock()
            .map_err(|_| NuggetError::Storage("apply lock poisoned".into()))?;

        let mut staged = StagedState::new(&self.db);
        f(&mut staged)?;

        staged.commit(caller, now)
    }

    /// Validate and apply a transaction.
    pub fn apply(&self, tx: &Transaction, now: Timestamp) -> Result<Receipt, NuggetError> {
        let result = if tx.value > 0 && !tx.call.is_payable() {
            Err(NuggetError::NonPayable)
        } else {
            self.execute(tx.caller, now, |state| dispatch(state, tx, now))
        };

        match &result {
            Ok(receipt) => {
                info!(
                    seq = receipt.seq,
                    call = tx.call.name(),
                    caller = %tx.caller,
                    events = receipt.events.len(),
                    "transaction applied"
                );
                for event in &receipt.events {
                    debug!(seq = receipt.seq, event = event.name(), "event emitted");
                }
            }
            Err(e) => warn!(
                call = tx.call.name(),
                caller = %tx.caller,
                error = %e,
                "transaction rejected"
            ),
        }
        result
    }
}

fn dispatch(state: &mut StagedState<'_>, tx: &Transaction, now: Timestamp) -> Result<(), NuggetError> {
    let caller = &tx.caller;
    match &tx.call {
        Call::Buy { collection, proof, token_id } => {
            sale::buy(state, caller, tx.value, collection, proof, *token_id, now)
        }
        Call::BuyBulk { collection, proof, token_ids } => {
            sale::buy_bulk(state, caller, tx.value, collection, proof, token_ids, now)
        }
        Call::SetMerkleRoot { collection, root, pointer } => {
            sale::set_merkle_root(state, caller, collection, *root, pointer.clone())
        }
        Call::SetFundingWallet { collection, wallet } => {
            sale::set_funding_wallet(state, caller, collection, *wallet)
        }
        Call::TransferNft { collection, to, token_id } => {
            transfer_nft(state, caller, collection, to, *token_id, now)
        }
        Call::AddNft { collection, percentage_threshold } => {
            staking::add_nft(state, caller, collection, *percentage_threshold)
        }
        Call::Claim => staking::claim(state, caller, now).map(|_| ()),
        Call::WithdrawNft { collection, token_id } => {
            staking::withdraw_nft(state, caller, collection, *token_id, now)
        }
        // Invoked directly, the hook sees the caller as the collection.
        Call::OnNftReceived { from, token_id } => {
            staking::on_nft_received(state, caller, from, *token_id, now)
        }
        Call::GrantMinterRole { account } => grant_minter_role(state, caller, account),
    }
}

/// Holder-initiated transfer. Landing on the staking contract runs the
/// deposit hook inside the same transaction.
fn transfer_nft(
    state: &mut StagedState<'_>,
    caller: &Address,
    collection: &Address,
    to: &Address,
    id: TokenId,
    now: Timestamp,
) -> Result<(), NuggetError> {
    state.collection(collection)?;
    if to.is_zero() {
        return Err(NuggetError::ZeroAddress);
    }
    match state.owner_of(collection, id)? {
        None => return Err(NuggetError::UnknownToken(id)),
        Some(holder) if holder != *caller => return Err(NuggetError::NotTokenHolder(id)),
        Some(_) => {}
    }

    state.transfer_nft(collection, caller, to, id)?;
    if state.staking_address()? == Some(*to) {
        staking::on_nft_received(state, collection, caller, id, now)?;
    }
    Ok(())
}
