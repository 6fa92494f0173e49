//! In-memory transactional store for marketplace state.

use crate::market::domain::{AgentId, Amount, AssetId, MarketResult};
use crate::market::ports::store::{poisoned, MarketStore};
use crate::market::state::MarketState;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory market store with all-or-nothing commits.
///
/// A transaction clones the committed state, lets the closure validate and
/// mutate the clone, and swaps the clone in only on success. A failed
/// transaction leaves the committed state untouched, and readers never see a
/// transaction's intermediate writes. Transactions on the same store
/// serialize through the write lock, so of two conflicting operations
/// exactly one commits and the other re-validates against the updated state.
#[derive(Debug, Clone)]
pub struct InMemoryMarketStore {
    state: Arc<RwLock<MarketState>>,
}

impl InMemoryMarketStore {
    /// Creates an empty store settling in `asset`.
    #[must_use]
    pub fn new(asset: AssetId) -> Self {
        Self {
            state: Arc::new(RwLock::new(MarketState::new(asset))),
        }
    }

    /// Credits `amount` to `account`, standing in for the host ledger's
    /// external settlement on-ramp.
    ///
    /// # Errors
    ///
    /// Returns [`crate::market::domain::MarketError::Overflow`] when the
    /// balance would overflow.
    pub fn credit_account(&self, account: AgentId, amount: Amount) -> MarketResult<()> {
        self.transact(|state| state.ledger_mut().credit(account, amount))
    }
}

impl Default for InMemoryMarketStore {
    fn default() -> Self {
        Self::new(AssetId::new())
    }
}

impl MarketStore for InMemoryMarketStore {
    fn read<T>(&self, view: impl FnOnce(&MarketState) -> MarketResult<T>) -> MarketResult<T> {
        let state = self.state.read().map_err(poisoned)?;
        view(&state)
    }

    fn transact<T>(
        &self,
        tx: impl FnOnce(&mut MarketState) -> MarketResult<T>,
    ) -> MarketResult<T> {
        let mut committed = self.state.write().map_err(poisoned)?;
        let mut staged = committed.clone();
        let outcome = tx(&mut staged)?;
        *committed = staged;
        Ok(outcome)
    }
}
