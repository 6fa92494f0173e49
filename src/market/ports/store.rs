//! Transactional persistence port for marketplace state.

use crate::market::domain::{MarketError, MarketResult};
use crate::market::state::MarketState;

/// Atomic transaction contract over [`MarketState`].
///
/// Every marketplace operation runs inside [`MarketStore::transact`]: the
/// transaction closure validates its preconditions against the latest
/// committed state and stages its mutations, and the implementation commits
/// them all or none. Conflicting transactions serialize; the loser of a
/// conflict re-validates against the winner's committed state and fails with
/// a typed error rather than observing a torn intermediate state.
pub trait MarketStore: Send + Sync {
    /// Runs a read-only view over a consistent snapshot of committed state.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Store`] when the store itself fails, or
    /// whatever the view returns.
    fn read<T>(&self, view: impl FnOnce(&MarketState) -> MarketResult<T>) -> MarketResult<T>;

    /// Runs `tx` against the latest committed state and commits its staged
    /// mutations if and only if it returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Store`] when the store itself fails, or the
    /// transaction's own error, in which case no mutation is applied.
    fn transact<T>(
        &self,
        tx: impl FnOnce(&mut MarketState) -> MarketResult<T>,
    ) -> MarketResult<T>;
}

/// Maps a poisoned-lock failure into the store error variant.
pub(crate) fn poisoned<E: std::fmt::Display>(err: E) -> MarketError {
    MarketError::Store(err.to_string())
}
