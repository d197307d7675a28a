//! In-memory knowledge token ledger.

use crate::issuer::RewardIssuer;
use crate::{Result, TokenError};
use ikf_types::{Address, TokenAmount};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Mintable token. The deployer owns it, receives the initial supply and
/// decides which accounts may mint.
#[derive(Debug)]
pub struct KnowledgeToken {
    address: Address,
    owner: Address,
    inner: RwLock<Ledger>,
}

#[derive(Debug, Default)]
struct Ledger {
    balances: HashMap<Address, TokenAmount>,
    minters: BTreeSet<Address>,
    total_supply: TokenAmount,
}

/// Serializable image of a token, used by the CLI state file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub address: Address,
    pub owner: Address,
    pub total_supply: TokenAmount,
    pub minters: Vec<Address>,
    pub balances: Vec<(Address, TokenAmount)>,
}

impl KnowledgeToken {
    /// Deploy a token at `address`, crediting `initial_supply` to `owner`.
    pub fn new(address: Address, owner: Address, initial_supply: TokenAmount) -> Self {
        let mut ledger = Ledger::default();
        if initial_supply > 0 {
            ledger.balances.insert(owner, initial_supply);
        }
        ledger.total_supply = initial_supply;

        info!(
            target: "token",
            "Token {} deployed by {} with supply {}",
            address, owner, initial_supply
        );

        Self {
            address,
            owner,
            inner: RwLock::new(ledger),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Authorize `minter`. Owner only.
    pub fn add_minter(&self, caller: &Address, minter: Address) -> Result<()> {
        self.require_owner(caller)?;
        if minter.is_zero() {
            return Err(TokenError::ZeroMinter);
        }
        self.inner.write().minters.insert(minter);
        info!(target: "token", "Minter added: {}", minter);
        Ok(())
    }

    /// Revoke `minter`. Owner only; revoking an unknown account is a no-op.
    pub fn remove_minter(&self, caller: &Address, minter: &Address) -> Result<()> {
        self.require_owner(caller)?;
        if self.inner.write().minters.remove(minter) {
            info!(target: "token", "Minter removed: {}", minter);
        }
        Ok(())
    }

    pub fn minters(&self) -> Vec<Address> {
        self.inner.read().minters.iter().copied().collect()
    }

    pub fn snapshot(&self) -> TokenSnapshot {
        let ledger = self.inner.read();
        let mut balances: Vec<(Address, TokenAmount)> =
            ledger.balances.iter().map(|(a, b)| (*a, *b)).collect();
        balances.sort();
        TokenSnapshot {
            address: self.address,
            owner: self.owner,
            total_supply: ledger.total_supply,
            minters: ledger.minters.iter().copied().collect(),
            balances,
        }
    }

    /// Rebuild a token from `snapshot`. Balances must be distinct and sum
    /// to the recorded total supply.
    pub fn restore(snapshot: TokenSnapshot) -> Result<Self> {
        let entries = snapshot.balances.len();
        let balances: HashMap<Address, TokenAmount> = snapshot.balances.into_iter().collect();
        if balances.len() != entries {
            return Err(TokenError::InvalidSnapshot(
                "duplicate balance entries".to_string(),
            ));
        }
        let sum = balances
            .values()
            .try_fold(0u128, |acc, balance| acc.checked_add(*balance))
            .ok_or_else(|| TokenError::InvalidSnapshot("balances overflow".to_string()))?;
        if sum != snapshot.total_supply {
            return Err(TokenError::InvalidSnapshot(format!(
                "balances sum to {} but total supply is {}",
                sum, snapshot.total_supply
            )));
        }

        let ledger = Ledger {
            balances,
            minters: snapshot.minters.into_iter().collect(),
            total_supply: snapshot.total_supply,
        };
        Ok(Self {
            address: snapshot.address,
            owner: snapshot.owner,
            inner: RwLock::new(ledger),
        })
    }

    fn require_owner(&self, caller: &Address) -> Result<()> {
        if *caller != self.owner {
            return Err(TokenError::NotOwner { caller: *caller });
        }
        Ok(())
    }
}

impl RewardIssuer for KnowledgeToken {
    fn address(&self) -> Address {
        self.address
    }

    fn is_minter(&self, account: &Address) -> bool {
        self.inner.read().minters.contains(account)
    }

    fn mint(&self, minter: &Address, recipient: &Address, amount: TokenAmount) -> Result<()> {
        let mut ledger = self.inner.write();
        if !ledger.minters.contains(minter) {
            return Err(TokenError::NotMinter { minter: *minter });
        }
        if recipient.is_zero() {
            return Err(TokenError::ZeroRecipient);
        }

        let total = ledger
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow { amount })?;
        // Any single balance is bounded by total supply, so this cannot overflow.
        *ledger.balances.entry(*recipient).or_default() += amount;
        ledger.total_supply = total;

        debug!(target: "token", "Minted {} to {} (minter {})", amount, recipient, minter);
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> TokenAmount {
        self.inner.read().balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> TokenAmount {
        self.inner.read().total_supply
    }
}
