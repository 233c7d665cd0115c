use nugget_core::error::NuggetError;
use nugget_core::event::Event;
use nugget_core::types::{Address, TokenId, Wei};

use crate::staged::StagedState;

/// Asset bookkeeping the sale and staking logic lean on: token ownership,
/// native value movement and reward-token minting.
pub trait AssetLedger {
    fn owner_of(&self, collection: &Address, id: TokenId) -> Result<Option<Address>, NuggetError>;

    /// Record a fresh token. Fails with `AlreadyMinted` if the id exists.
    fn mint_nft(&mut self, collection: &Address, to: &Address, id: TokenId) -> Result<(), NuggetError>;

    /// Move a token and emit `NftTransfer`. Holder checks are the caller's job.
    fn transfer_nft(
        &mut self,
        collection: &Address,
        from: &Address,
        to: &Address,
        id: TokenId,
    ) -> Result<(), NuggetError>;

    fn transfer_value(&mut self, from: &Address, to: &Address, amount: Wei) -> Result<(), NuggetError>;

    /// Mint reward units through the reward token on behalf of `minter`.
    fn mint_reward(&mut self, minter: &Address, to: &Address, amount: Wei) -> Result<(), NuggetError>;
}

impl AssetLedger for StagedState<'_> {
    fn owner_of(&self, collection: &Address, id: TokenId) -> Result<Option<Address>, NuggetError> {
        self.token_owner(collection, id)
    }

    fn mint_nft(&mut self, collection: &Address, to: &Address, id: TokenId) -> Result<(), NuggetError> {
        if self.token_owner(collection, id)?.is_some() {
            return Err(NuggetError::AlreadyMinted(id));
        }
        self.set_token_owner(collection, id, *to);
        Ok(())
    }

    fn transfer_nft(
        &mut self,
        collection: &Address,
        from: &Address,
        to: &Address,
        id: TokenId,
    ) -> Result<(), NuggetError> {
        self.set_token_owner(collection, id, *to);
        self.emit(Event::NftTransfer {
            collection: *collection,
            from: *from,
            to: *to,
            token_id: id,
        });
        Ok(())
    }

    fn transfer_value(&mut self, from: &Address, to: &Address, amount: Wei) -> Result<(), NuggetError> {
        if amount == 0 || from == to {
            return Ok(());
        }
        let have = self.balance(from)?;
        if have < amount {
            return Err(NuggetError::InsufficientBalance { need: amount, have });
        }
        let credited = self
            .balance(to)?
            .checked_add(amount)
            .ok_or(NuggetError::ArithmeticOverflow)?;
        self.set_balance(from, have - amount);
        self.set_balance(to, credited);
        Ok(())
    }

    fn mint_reward(&mut self, minter: &Address, to: &Address, amount: Wei) -> Result<(), NuggetError> {
        let mut token = self.reward_token()?;
        if !token.is_minter(minter) {
            return Err(NuggetError::MissingMinterRole);
        }
        token.total_supply = token
            .total_supply
            .checked_add(amount)
            .ok_or(NuggetError::ArithmeticOverflow)?;
        let balance = self
            .reward_balance(to)?
            .checked_add(amount)
            .ok_or(NuggetError::ArithmeticOverflow)?;
        self.set_reward_balance(to, balance);
        self.put_reward_token(token);
        self.emit(Event::RewardTransfer {
            from: Address::ZERO,
            to: *to,
            amount,
        });
        Ok(())
    }
}

/// Grant the reward-token minter role. Reward-token admin only.
pub fn grant_minter_role(
    state: &mut StagedState<'_>,
    caller: &Address,
    account: &Address,
) -> Result<(), NuggetError> {
    let mut token = state.reward_token()?;
    if token.admin != *caller {
        return Err(NuggetError::Unauthorized);
    }
    if account.is_zero() {
        return Err(NuggetError::ZeroAddress);
    }
    if !token.is_minter(account) {
        token.minters.push(*account);
        state.put_reward_token(token);
    }
    state.emit(Event::MinterRoleGranted { account: *account });
    Ok(())
}
