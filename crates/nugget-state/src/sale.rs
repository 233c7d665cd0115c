use nugget_core::collection::Collection;
use nugget_core::error::NuggetError;
use nugget_core::event::Event;
use nugget_core::types::{Address, Hash32, Timestamp, TokenId, Wei};
use tracing::debug;

use crate::ledger::AssetLedger;
use crate::pricing::Quote;
use crate::staged::StagedState;

// ── Deployment ────────────────────────────────────────────────────────────────

/// Install a new collection and pre-mint its reserved range to the owner.
///
/// Each reserved id emits `Bought { price: 0 }` and `PermanentUri`, so the
/// circulating supply equals the range length afterwards.
pub fn deploy_collection(state: &mut StagedState<'_>, mut collection: Collection) -> Result<(), NuggetError> {
    collection.config.validate()?;
    if collection.funding_wallet.is_zero() || collection.owner.is_zero() {
        return Err(NuggetError::ZeroAddress);
    }
    if state.find_collection(&collection.address)?.is_some() {
        return Err(NuggetError::InvalidConfig(format!(
            "collection {} already deployed",
            collection.address
        )));
    }

    collection.circulating_supply = 0;
    let deployer = collection.owner;
    for id in collection.config.reserved.ids() {
        state.mint_nft(&collection.address, &deployer, id)?;
        collection.circulating_supply += 1;
        emit_purchase(state, &collection, id, &deployer, 0);
    }
    debug!(
        collection = %collection.address,
        reserved = collection.circulating_supply,
        "reserved range minted"
    );
    state.put_collection(collection);
    Ok(())
}

fn emit_purchase(state: &mut StagedState<'_>, collection: &Collection, id: TokenId, buyer: &Address, price: Wei) {
    state.emit(Event::Bought { token_id: id, buyer: *buyer, price });
    state.emit(Event::PermanentUri { uri: collection.token_uri(id), token_id: id });
}

// ── Purchases ─────────────────────────────────────────────────────────────────

pub fn buy(
    state: &mut StagedState<'_>,
    buyer: &Address,
    value: Wei,
    collection: &Address,
    proof: &[Hash32],
    id: TokenId,
    now: Timestamp,
) -> Result<(), NuggetError> {
    let mut c = state.collection(collection)?;
    if !c.config.contains(id) {
        return Err(NuggetError::InvalidToken(id));
    }

    let quote = Quote::for_buyer(&c, proof, buyer);
    quote.ensure_eligible(&c, now)?;
    if value != quote.price {
        return Err(NuggetError::InvalidPayment { expected: quote.price, got: value });
    }

    state.mint_nft(&c.address, buyer, id)?;
    c.circulating_supply = c
        .circulating_supply
        .checked_add(1)
        .ok_or(NuggetError::ArithmeticOverflow)?;
    state.transfer_value(buyer, &c.funding_wallet, value)?;

    emit_purchase(state, &c, id, buyer, quote.price);
    state.put_collection(c);
    Ok(())
}

/// Buy several ids at one price snapshot. Any failure aborts the whole batch.
pub fn buy_bulk(
    state: &mut StagedState<'_>,
    buyer: &Address,
    value: Wei,
    collection: &Address,
    proof: &[Hash32],
    ids: &[TokenId],
    now: Timestamp,
) -> Result<(), NuggetError> {
    let mut c = state.collection(collection)?;

    let quote = Quote::for_buyer(&c, proof, buyer);
    quote.ensure_eligible(&c, now)?;
    if ids.is_empty() {
        return Err(NuggetError::EmptyBatch);
    }

    // An overflowing total can never be matched by any payment.
    let total = (ids.len() as u128)
        .checked_mul(quote.price)
        .ok_or(NuggetError::InvalidPayment { expected: Wei::MAX, got: value })?;
    if value != total {
        return Err(NuggetError::InvalidPayment { expected: total, got: value });
    }
    if let Some(bad) = ids.iter().find(|id| !c.config.contains(**id)) {
        return Err(NuggetError::InvalidToken(*bad));
    }

    for id in ids {
        state.mint_nft(&c.address, buyer, *id)?;
        c.circulating_supply = c
            .circulating_supply
            .checked_add(1)
            .ok_or(NuggetError::ArithmeticOverflow)?;
        emit_purchase(state, &c, *id, buyer, quote.price);
    }
    state.transfer_value(buyer, &c.funding_wallet, value)?;
    state.put_collection(c);
    Ok(())
}

// ── Owner administration ──────────────────────────────────────────────────────

/// Replace the allow-list root and pointer together.
pub fn set_merkle_root(
    state: &mut StagedState<'_>,
    caller: &Address,
    collection: &Address,
    root: Hash32,
    pointer: String,
) -> Result<(), NuggetError> {
    let mut c = state.collection(collection)?;
    if c.owner != *caller {
        return Err(NuggetError::Unauthorized);
    }
    c.whitelist.root = root;
    c.whitelist.pointer = pointer.clone();
    state.put_collection(c);
    state.emit(Event::MerkleRootSet { root, pointer });
    Ok(())
}

pub fn set_funding_wallet(
    state: &mut StagedState<'_>,
    caller: &Address,
    collection: &Address,
    wallet: Address,
) -> Result<(), NuggetError> {
    let mut c = state.collection(collection)?;
    if c.owner != *caller {
        return Err(NuggetError::Unauthorized);
    }
    if wallet.is_zero() {
        return Err(NuggetError::ZeroAddress);
    }
    c.funding_wallet = wallet;
    state.put_collection(c);
    state.emit(Event::FundingWalletSet { wallet });
    Ok(())
}
