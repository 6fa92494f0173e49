//! Committed marketplace state: record collections and the asset ledger.

use crate::market::domain::{
    AgentId, AgentProfile, Amount, AssetId, Bid, BidKey, Escrow, EscrowKey, MarketError,
    MarketResult, ProfileKey, Review, ReviewKey, Task, TaskKey,
};
use crate::store::Records;
use std::collections::HashMap;

/// The whole of the marketplace's committed state.
///
/// One collection per entity family plus the [`AssetLedger`] holding account
/// balances and escrow custody. A transaction stages its mutations on a copy
/// of this state and the adapter swaps the copy in only when the transaction
/// succeeds, so no partially-applied state is ever observable.
#[derive(Debug, Clone)]
pub struct MarketState {
    tasks: Records<TaskKey, Task>,
    bids: Records<BidKey, Bid>,
    escrows: Records<EscrowKey, Escrow>,
    profiles: Records<ProfileKey, AgentProfile>,
    reviews: Records<ReviewKey, Review>,
    ledger: AssetLedger,
}

impl MarketState {
    /// Creates an empty state settling in `asset`.
    #[must_use]
    pub fn new(asset: AssetId) -> Self {
        Self {
            tasks: Records::new(),
            bids: Records::new(),
            escrows: Records::new(),
            profiles: Records::new(),
            reviews: Records::new(),
            ledger: AssetLedger::new(asset),
        }
    }

    /// Returns the task collection.
    #[must_use]
    pub const fn tasks(&self) -> &Records<TaskKey, Task> {
        &self.tasks
    }

    /// Returns the task collection mutably.
    pub const fn tasks_mut(&mut self) -> &mut Records<TaskKey, Task> {
        &mut self.tasks
    }

    /// Returns the bid collection.
    #[must_use]
    pub const fn bids(&self) -> &Records<BidKey, Bid> {
        &self.bids
    }

    /// Returns the bid collection mutably.
    pub const fn bids_mut(&mut self) -> &mut Records<BidKey, Bid> {
        &mut self.bids
    }

    /// Returns the escrow collection.
    #[must_use]
    pub const fn escrows(&self) -> &Records<EscrowKey, Escrow> {
        &self.escrows
    }

    /// Returns the escrow collection mutably.
    pub const fn escrows_mut(&mut self) -> &mut Records<EscrowKey, Escrow> {
        &mut self.escrows
    }

    /// Returns the profile collection.
    #[must_use]
    pub const fn profiles(&self) -> &Records<ProfileKey, AgentProfile> {
        &self.profiles
    }

    /// Returns the profile collection mutably.
    pub const fn profiles_mut(&mut self) -> &mut Records<ProfileKey, AgentProfile> {
        &mut self.profiles
    }

    /// Returns the review collection.
    #[must_use]
    pub const fn reviews(&self) -> &Records<ReviewKey, Review> {
        &self.reviews
    }

    /// Returns the review collection mutably.
    pub const fn reviews_mut(&mut self) -> &mut Records<ReviewKey, Review> {
        &mut self.reviews
    }

    /// Returns the asset ledger.
    #[must_use]
    pub const fn ledger(&self) -> &AssetLedger {
        &self.ledger
    }

    /// Returns the asset ledger mutably.
    pub const fn ledger_mut(&mut self) -> &mut AssetLedger {
        &mut self.ledger
    }
}

/// Single-asset balance ledger: participant accounts and escrow vaults.
///
/// Funds only ever move between an account and a vault or into an account
/// from the external on-ramp; every movement is a paired checked debit and
/// credit, so the ledger conserves funds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLedger {
    asset: AssetId,
    accounts: HashMap<AgentId, Amount>,
    vaults: HashMap<EscrowKey, Amount>,
}

impl AssetLedger {
    /// Creates an empty ledger denominated in `asset`.
    #[must_use]
    pub fn new(asset: AssetId) -> Self {
        Self {
            asset,
            accounts: HashMap::new(),
            vaults: HashMap::new(),
        }
    }

    /// Returns the settlement asset identifier.
    #[must_use]
    pub const fn asset(&self) -> AssetId {
        self.asset
    }

    /// Returns `account`'s balance; absent accounts hold zero.
    #[must_use]
    pub fn balance_of(&self, account: AgentId) -> Amount {
        self.accounts.get(&account).copied().unwrap_or(Amount::ZERO)
    }

    /// Returns the custody held by `vault`; absent vaults hold zero.
    #[must_use]
    pub fn vault_balance(&self, vault: EscrowKey) -> Amount {
        self.vaults.get(&vault).copied().unwrap_or(Amount::ZERO)
    }

    /// Credits `amount` to `account` from the external settlement on-ramp.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Overflow`] when the balance would overflow.
    pub fn credit(&mut self, account: AgentId, amount: Amount) -> MarketResult<()> {
        let balance = self.balance_of(account);
        let updated = balance.checked_add(amount).ok_or(MarketError::Overflow {
            operation: "crediting an account balance",
        })?;
        self.accounts.insert(account, updated);
        Ok(())
    }

    /// Moves `amount` from `account` into `vault`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InsufficientFunds`] when the account cannot
    /// cover the amount and [`MarketError::Overflow`] when the vault balance
    /// would overflow.
    pub fn deposit_to_vault(
        &mut self,
        vault: EscrowKey,
        account: AgentId,
        amount: Amount,
    ) -> MarketResult<()> {
        let available = self.balance_of(account);
        let remainder = available
            .checked_sub(amount)
            .ok_or(MarketError::InsufficientFunds {
                required: amount,
                available,
            })?;
        let held = self.vault_balance(vault);
        let updated = held.checked_add(amount).ok_or(MarketError::Overflow {
            operation: "crediting an escrow vault",
        })?;
        self.accounts.insert(account, remainder);
        self.vaults.insert(vault, updated);
        Ok(())
    }

    /// Moves `amount` from `vault` to `account`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Underflow`] when the vault does not hold the
    /// amount and [`MarketError::Overflow`] when the account balance would
    /// overflow.
    pub fn release_from_vault(
        &mut self,
        vault: EscrowKey,
        account: AgentId,
        amount: Amount,
    ) -> MarketResult<()> {
        let held = self.vault_balance(vault);
        let remainder = held.checked_sub(amount).ok_or(MarketError::Underflow {
            operation: "debiting an escrow vault",
        })?;
        let balance = self.balance_of(account);
        let updated = balance.checked_add(amount).ok_or(MarketError::Overflow {
            operation: "crediting an account balance",
        })?;
        self.vaults.insert(vault, remainder);
        self.accounts.insert(account, updated);
        Ok(())
    }

    /// Sums every account and vault balance.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Overflow`] when the grand total overflows.
    pub fn total_supply(&self) -> MarketResult<Amount> {
        let balances = self.accounts.values().chain(self.vaults.values()).copied();
        Amount::checked_sum(balances).ok_or(MarketError::Overflow {
            operation: "summing ledger balances",
        })
    }
}
