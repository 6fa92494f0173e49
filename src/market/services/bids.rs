//! Service layer for bid submission and resolution.

use super::ensure_caller;
use crate::market::domain::{AgentId, Bid, BidKey, BidTerms, MarketResult, TaskKey};
use crate::market::ports::MarketStore;
use mockable::Clock;
use std::sync::Arc;

/// Bid submission and resolution orchestration service.
#[derive(Clone)]
pub struct BidService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> BidService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    /// Creates a new bid service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Submits `caller`'s bid against `task` and returns its key.
    ///
    /// One bid per (task, bidder) pair: resubmitting reproduces the same key
    /// and the store rejects the duplicate, regardless of the earlier bid's
    /// status.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for an unknown task, `InvalidState` when the
    /// task is not `Open`, `Validation` when the terms fail validation, and
    /// `DuplicateRecord` when the caller has already bid on the task.
    pub fn submit_bid(
        &self,
        caller: AgentId,
        task: TaskKey,
        terms: BidTerms,
    ) -> MarketResult<BidKey> {
        let key = BidKey::derive(task, caller);
        self.store.transact(|state| {
            let record = state.tasks().fetch(task)?;
            let bid = Bid::submit(task, record, caller, terms, &*self.clock)?;
            state.bids_mut().create(key, bid)?;
            Ok(key)
        })
    }

    /// Accepts `bid` as its task's single winning bid.
    ///
    /// The task moves to `InProgress` with its milestones re-priced to the
    /// bid amount; every other bid on the task stays `Pending` until
    /// rejected or withdrawn, but no second bid can ever be accepted because
    /// the task has left `Open`.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for an unknown bid, `Unauthorized` when the
    /// caller does not own the task, `InvalidState` when the bid is not
    /// `Pending` or the task is not `Open`, and `Validation` when re-pricing
    /// cannot give every milestone a positive amount.
    pub fn accept_bid(&self, caller: AgentId, bid: BidKey) -> MarketResult<()> {
        self.store.transact(|state| {
            let record = state.bids().fetch(bid)?;
            let task = record.task();
            let agreed = record.amount();
            let owner = state.tasks().fetch(task)?.owner();
            ensure_caller(owner, caller, "accept bids on this task")?;
            state.bids_mut().fetch_mut(bid)?.accept()?;
            state
                .tasks_mut()
                .fetch_mut(task)?
                .record_acceptance(bid, agreed, &*self.clock)
        })
    }

    /// Declines `bid` on behalf of the task owner.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for an unknown bid, `Unauthorized` when the
    /// caller does not own the task, and `InvalidState` when the bid is not
    /// `Pending`.
    pub fn reject_bid(&self, caller: AgentId, bid: BidKey) -> MarketResult<()> {
        self.store.transact(|state| {
            let task = state.bids().fetch(bid)?.task();
            let owner = state.tasks().fetch(task)?.owner();
            ensure_caller(owner, caller, "reject bids on this task")?;
            state.bids_mut().fetch_mut(bid)?.reject()
        })
    }

    /// Retracts `caller`'s own pending bid.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for an unknown bid, `Unauthorized` when the
    /// caller is not the bidder, and `InvalidState` when the bid is not
    /// `Pending`.
    pub fn withdraw_bid(&self, caller: AgentId, bid: BidKey) -> MarketResult<()> {
        self.store.transact(|state| {
            let record = state.bids_mut().fetch_mut(bid)?;
            ensure_caller(record.bidder(), caller, "withdraw this bid")?;
            record.withdraw()
        })
    }

    /// Retrieves a bid by key.
    ///
    /// Returns `Ok(None)` when no bid exists at the key.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the store itself fails.
    pub fn find_bid(&self, bid: BidKey) -> MarketResult<Option<Bid>> {
        self.store.read(|state| Ok(state.bids().get(bid).cloned()))
    }
}
