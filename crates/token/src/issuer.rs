//! Reward issuer interface
//!
//! The registry only ever needs `mint` and an inspection surface; any
//! mintable ledger can stand behind this trait.

use crate::{Result, TokenError};
use ikf_types::{Address, TokenAmount};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Interface for the external minting service invoked on approval.
pub trait RewardIssuer: Send + Sync {
    /// Identity the registry binds to. Never the null identity for a
    /// bindable issuer.
    fn address(&self) -> Address;

    /// Whether `account` may call `mint`.
    fn is_minter(&self, account: &Address) -> bool;

    /// Credit `amount` to `recipient` on behalf of `minter`. Either the whole
    /// credit applies or nothing does.
    fn mint(&self, minter: &Address, recipient: &Address, amount: TokenAmount) -> Result<()>;

    fn balance_of(&self, account: &Address) -> TokenAmount;

    fn total_supply(&self) -> TokenAmount;
}

// -----------------------------------------------------------------------------
// Mock issuer (for deterministic testing of failure paths)
// -----------------------------------------------------------------------------
#[derive(Debug)]
pub struct MockRewardIssuer {
    address: Address,
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    balances: HashMap<Address, TokenAmount>,
    total_supply: TokenAmount,
    mint_calls: Vec<(Address, Address, TokenAmount)>,
    fail_next: Option<String>,
}

impl MockRewardIssuer {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Make the next `mint` call fail with `TokenError::Unavailable`.
    pub fn fail_next_mint(&self, reason: impl Into<String>) {
        self.state.lock().fail_next = Some(reason.into());
    }

    pub fn mint_calls(&self) -> Vec<(Address, Address, TokenAmount)> {
        self.state.lock().mint_calls.clone()
    }
}

impl RewardIssuer for MockRewardIssuer {
    fn address(&self) -> Address {
        self.address
    }

    fn is_minter(&self, _account: &Address) -> bool {
        true
    }

    fn mint(&self, minter: &Address, recipient: &Address, amount: TokenAmount) -> Result<()> {
        let mut state = self.state.lock();
        state.mint_calls.push((*minter, *recipient, amount));
        if let Some(reason) = state.fail_next.take() {
            return Err(TokenError::Unavailable(reason));
        }
        *state.balances.entry(*recipient).or_default() += amount;
        state.total_supply += amount;
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> TokenAmount {
        self.state.lock().balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> TokenAmount {
        self.state.lock().total_supply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_records_calls_and_credits() {
        let mock = MockRewardIssuer::new(Address::from_label("token"));
        let minter = Address::from_label("registry");
        let alice = Address::from_label("alice");

        mock.mint(&minter, &alice, 500).unwrap();

        assert_eq!(mock.balance_of(&alice), 500);
        assert_eq!(mock.total_supply(), 500);
        assert_eq!(mock.mint_calls(), vec![(minter, alice, 500)]);
    }

    #[test]
    fn mock_failure_is_one_shot_and_credits_nothing() {
        let mock = MockRewardIssuer::new(Address::from_label("token"));
        let minter = Address::from_label("registry");
        let alice = Address::from_label("alice");

        mock.fail_next_mint("offline");
        let err = mock.mint(&minter, &alice, 10).unwrap_err();
        assert_eq!(err, TokenError::Unavailable("offline".into()));
        assert_eq!(mock.balance_of(&alice), 0);

        mock.mint(&minter, &alice, 10).unwrap();
        assert_eq!(mock.balance_of(&alice), 10);
        assert_eq!(mock.mint_calls().len(), 2);
    }
}
