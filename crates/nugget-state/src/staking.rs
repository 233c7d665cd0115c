use nugget_core::collection::Collection;
use nugget_core::constants::{MAX_PERCENTAGE_THRESHOLD, REWARD_RATE_PER_TOKEN_SEC};
use nugget_core::error::NuggetError;
use nugget_core::event::Event;
use nugget_core::staking::{NftInfo, NftStatus, RewardToken, StakeInfo, StakingContract};
use nugget_core::types::{Address, Timestamp, TokenId, Wei};
use tracing::debug;

use crate::ledger::AssetLedger;
use crate::staged::StagedState;

// ── Deployment ────────────────────────────────────────────────────────────────

/// Install the staking contract and its reward token. The minter role is
/// granted separately.
pub fn deploy_staking(
    state: &mut StagedState<'_>,
    staking: StakingContract,
    token: RewardToken,
) -> Result<(), NuggetError> {
    if state.staking_address()?.is_some() {
        return Err(NuggetError::InvalidConfig("staking already deployed".into()));
    }
    if staking.owner.is_zero() || token.admin.is_zero() {
        return Err(NuggetError::ZeroAddress);
    }
    if staking.reward_token != token.address {
        return Err(NuggetError::InvalidConfig(format!(
            "staking expects reward token {}, got {}",
            staking.reward_token, token.address
        )));
    }
    state.put_staking(staking);
    state.put_reward_token(token);
    Ok(())
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Live activation check. Unregistered collections are never active.
pub fn is_active(collection: &Collection, info: &NftInfo) -> bool {
    info.status != NftStatus::NotAdded
        && collection.minted_percentage() >= u64::from(info.percentage_threshold)
}

pub fn collection_active(state: &StagedState<'_>, collection: &Address) -> Result<bool, NuggetError> {
    let Some(info) = state.nft_info(collection)? else {
        return Ok(false);
    };
    let Some(c) = state.find_collection(collection)? else {
        return Ok(false);
    };
    Ok(is_active(&c, &info))
}

/// Register `collection` with staking. The recorded status is a snapshot;
/// deposits consult `is_active` instead.
pub fn add_nft(
    state: &mut StagedState<'_>,
    caller: &Address,
    collection: &Address,
    percentage_threshold: u8,
) -> Result<(), NuggetError> {
    let staking = state.staking()?;
    if staking.owner != *caller {
        return Err(NuggetError::Unauthorized);
    }
    if percentage_threshold > MAX_PERCENTAGE_THRESHOLD {
        return Err(NuggetError::InvalidThreshold(percentage_threshold));
    }
    let c = state.collection(collection)?;
    if state
        .nft_info(collection)?
        .is_some_and(|info| info.status != NftStatus::NotAdded)
    {
        return Err(NuggetError::AlreadyAdded);
    }

    let status = if c.minted_percentage() >= u64::from(percentage_threshold) {
        NftStatus::Active
    } else {
        NftStatus::PendingThreshold
    };
    state.put_nft_info(collection, NftInfo { percentage_threshold, status });
    state.emit(Event::NftAdded { collection: *collection });
    Ok(())
}

// ── Accrual ───────────────────────────────────────────────────────────────────

/// Reward owed for the open interval of `stake` at `now`.
pub fn pending_reward(stake: &StakeInfo, now: Timestamp) -> Result<Wei, NuggetError> {
    if stake.is_idle() || now <= stake.start_date {
        return Ok(0);
    }
    let elapsed = (now - stake.start_date) as u128;
    elapsed
        .checked_mul(u128::from(stake.token_count))
        .and_then(|x| x.checked_mul(REWARD_RATE_PER_TOKEN_SEC))
        .ok_or(NuggetError::ArithmeticOverflow)
}

/// Settle the open interval with the count that held during it, then apply
/// `change`. This is the only path that alters `token_count`.
///
/// The stake record is written before the reward mint.
fn settle_then(
    state: &mut StagedState<'_>,
    staking: &StakingContract,
    depositor: &Address,
    now: Timestamp,
    change: impl FnOnce(&mut StakeInfo),
) -> Result<Wei, NuggetError> {
    let mut stake = state.stake(depositor)?.unwrap_or_default();
    let amount = pending_reward(&stake, now)?;

    change(&mut stake);
    stake.start_date = stake.start_date.max(now);
    state.put_stake(depositor, stake);

    if amount > 0 {
        state.mint_reward(&staking.address, depositor, amount)?;
        state.emit(Event::Claim { depositor: *depositor, amount });
        debug!(depositor = %depositor, amount, "rewards settled");
    }
    Ok(amount)
}

// ── Deposits and withdrawals ──────────────────────────────────────────────────

/// Receipt hook run after `id` of `collection` lands on the staking contract.
pub fn on_nft_received(
    state: &mut StagedState<'_>,
    collection: &Address,
    depositor: &Address,
    id: TokenId,
    now: Timestamp,
) -> Result<(), NuggetError> {
    let staking = state.staking()?;
    if !collection_active(state, collection)? {
        return Err(NuggetError::StakingNotStarted);
    }
    if state.owner_of(collection, id)? != Some(staking.address) || state.custody(collection, id)?.is_some() {
        return Err(NuggetError::NotReceived(id));
    }

    settle_then(state, &staking, depositor, now, |s| {
        s.token_count = s.token_count.saturating_add(1)
    })?;
    state.set_custody(collection, id, Some(*depositor));
    state.emit(Event::NftReceived {
        token_id: id,
        collection: *collection,
        depositor: *depositor,
    });
    Ok(())
}

/// Settle and mint whatever the caller has accrued. Returns the amount.
pub fn claim(state: &mut StagedState<'_>, caller: &Address, now: Timestamp) -> Result<Wei, NuggetError> {
    match state.stake(caller)? {
        Some(stake) if !stake.is_idle() => {}
        _ => return Ok(0),
    }
    let staking = state.staking()?;
    settle_then(state, &staking, caller, now, |_| {})
}

pub fn withdraw_nft(
    state: &mut StagedState<'_>,
    caller: &Address,
    collection: &Address,
    id: TokenId,
    now: Timestamp,
) -> Result<(), NuggetError> {
    let staking = state.staking()?;
    if state.custody(collection, id)? != Some(*caller) {
        return Err(NuggetError::NotOwner);
    }

    state.set_custody(collection, id, None);
    state.emit(Event::Withdraw {
        token_id: id,
        collection: *collection,
        depositor: *caller,
    });
    settle_then(state, &staking, caller, now, |s| {
        s.token_count = s.token_count.saturating_sub(1)
    })?;
    state.transfer_nft(collection, &staking.address, caller, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stake(count: u64, start: Timestamp) -> StakeInfo {
        StakeInfo { token_count: count, start_date: start }
    }

    #[test]
    fn reward_is_linear_in_time_and_count() {
        let s = stake(1, 1_000);
        assert_eq!(pending_reward(&s, 1_000 + 259_200).unwrap(), 259_200 * REWARD_RATE_PER_TOKEN_SEC);
        let s = stake(3, 1_000);
        assert_eq!(pending_reward(&s, 1_010).unwrap(), 30 * REWARD_RATE_PER_TOKEN_SEC);
    }

    #[test]
    fn no_reward_when_idle_or_clock_behind() {
        assert_eq!(pending_reward(&stake(0, 1_000), 5_000).unwrap(), 0);
        assert_eq!(pending_reward(&stake(2, 1_000), 1_000).unwrap(), 0);
        assert_eq!(pending_reward(&stake(2, 1_000), 900).unwrap(), 0);
    }

    #[test]
    fn overflow_is_reported() {
        let s = stake(u64::MAX, 0);
        assert!(matches!(pending_reward(&s, i64::MAX), Err(NuggetError::ArithmeticOverflow)));
    }

    #[test]
    fn activation_follows_floored_percentage() {
        use nugget_core::collection::{SaleConfig, WhitelistRegistry};
        use nugget_core::types::Hash32;

        let mut c = Collection {
            address: Address::from_bytes([0xC0; 20]),
            name: "Nugget".into(),
            symbol: "NUG".into(),
            owner: Address::from_bytes([1; 20]),
            config: SaleConfig::new("ipfs://meta/", 0),
            whitelist: WhitelistRegistry { root: Hash32::ZERO, pointer: String::new() },
            funding_wallet: Address::from_bytes([0xF0; 20]),
            circulating_supply: 100,
        };
        let info = NftInfo { percentage_threshold: 1, status: NftStatus::PendingThreshold };
        assert!(!is_active(&c, &info));
        c.circulating_supply = 101;
        assert!(is_active(&c, &info));
        assert!(!is_active(&c, &NftInfo::default()));
    }
}
