//! Service layer for escrow funding, milestone payment, and refunds.

use super::{apply_profile_effect, ensure_caller};
use crate::market::domain::{
    AgentId, AgentProfile, Amount, Escrow, EscrowKey, MarketError, MarketResult, TaskKey,
    TaskStatus,
};
use crate::market::ports::MarketStore;
use mockable::Clock;
use std::sync::Arc;

/// Escrow funding and payment orchestration service.
#[derive(Clone)]
pub struct EscrowService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> EscrowService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    /// Creates a new escrow service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Funds the escrow for `task` from the owner's account and returns the
    /// escrow's key.
    ///
    /// The escrow total is the accepted bid's amount, which after bid
    /// acceptance also equals the sum of the re-priced milestone amounts.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for an unknown task, `Unauthorized` when the
    /// caller is not the owner, `InvalidState` when the task has no accepted
    /// bid or is already funded, `InsufficientFunds` when the owner's
    /// account cannot cover the total, and `DuplicateRecord` when an escrow
    /// record already occupies the task's escrow key.
    pub fn fund_escrow(&self, caller: AgentId, task: TaskKey) -> MarketResult<EscrowKey> {
        let key = EscrowKey::derive(task);
        self.store.transact(|state| {
            let record = state.tasks().fetch(task)?;
            ensure_caller(record.owner(), caller, "fund this task's escrow")?;
            let bid = record.accepted_bid().ok_or_else(|| MarketError::InvalidState {
                entity: "task",
                status: record.status().as_str(),
            })?;
            let winning = state.bids().fetch(bid)?;
            let total = winning.amount();
            let freelancer = winning.bidder();
            let asset = state.ledger().asset();

            state.tasks_mut().fetch_mut(task)?.attach_escrow(key, &*self.clock)?;
            state.ledger_mut().deposit_to_vault(key, caller, total)?;
            let escrow = Escrow::open(task, caller, freelancer, total, asset, &*self.clock);
            state.escrows_mut().create(key, escrow)?;
            Ok(key)
        })
    }

    /// Marks a milestone as completed on behalf of the freelancer.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for an unknown task, `InvalidState` when the
    /// task is not `InProgress` or the milestone is already completed,
    /// `Unauthorized` when the caller is not the accepted bidder, and
    /// `InvalidMilestoneIndex` for an out-of-range index.
    pub fn complete_milestone(
        &self,
        caller: AgentId,
        task: TaskKey,
        index: usize,
    ) -> MarketResult<()> {
        self.store.transact(|state| {
            let record = state.tasks().fetch(task)?;
            let bid = record.accepted_bid().ok_or_else(|| MarketError::InvalidState {
                entity: "task",
                status: record.status().as_str(),
            })?;
            let freelancer = state.bids().fetch(bid)?.bidder();
            ensure_caller(freelancer, caller, "complete milestones on this task")?;
            state
                .tasks_mut()
                .fetch_mut(task)?
                .complete_milestone(index, &*self.clock)
        })
    }

    /// Releases the payment for a completed milestone from escrow custody to
    /// the freelancer's account, returning the released amount.
    ///
    /// Paying the last milestone completes the task and bumps both parties'
    /// completed-task counters. Earned and spent totals accrue on whichever
    /// of the two parties hold profiles.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for an unknown task, `Unauthorized` when the
    /// caller is not the owner, `InvalidState` when the task is not
    /// `InProgress` or is unfunded, `InvalidMilestoneIndex` for an
    /// out-of-range index, `MilestoneNotCompleted` when the milestone has
    /// not been completed, and `MilestoneAlreadyPaid` when it was already
    /// paid.
    pub fn release_payment(
        &self,
        caller: AgentId,
        task: TaskKey,
        index: usize,
    ) -> MarketResult<Amount> {
        self.store.transact(|state| {
            let record = state.tasks().fetch(task)?;
            ensure_caller(record.owner(), caller, "release payment on this task")?;
            let key = record.escrow().ok_or(MarketError::InvalidState {
                entity: "escrow",
                status: "unfunded",
            })?;

            let payment = state
                .tasks_mut()
                .fetch_mut(task)?
                .record_milestone_payment(index, &*self.clock)?;
            let escrow = state.escrows_mut().fetch_mut(key)?;
            escrow.record_release(payment.amount)?;
            let freelancer = escrow.freelancer();
            state.ledger_mut().release_from_vault(key, freelancer, payment.amount)?;

            apply_profile_effect(state, freelancer, |profile| {
                profile.record_earned(payment.amount)
            })?;
            apply_profile_effect(state, caller, |profile| {
                profile.record_spent(payment.amount)
            })?;
            if payment.task_completed {
                apply_profile_effect(state, freelancer, AgentProfile::record_task_completed)?;
                apply_profile_effect(state, caller, AgentProfile::record_task_completed)?;
            }
            Ok(payment.amount)
        })
    }

    /// Refunds all remaining escrow custody to the client, returning the
    /// refunded amount.
    ///
    /// A refund is permitted while the task is `Cancelled` or `Disputed`,
    /// or once the deadline has passed with no payment released.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for an unknown task, `Unauthorized` when the
    /// caller is not the owner, `InvalidState` when the task is unfunded,
    /// `RefundNotAllowed` when no refund condition holds, and
    /// `NoFundsToRefund` when nothing remains in custody.
    pub fn request_refund(&self, caller: AgentId, task: TaskKey) -> MarketResult<Amount> {
        self.store.transact(|state| {
            let record = state.tasks().fetch(task)?;
            ensure_caller(record.owner(), caller, "request a refund for this task")?;
            let key = record.escrow().ok_or(MarketError::InvalidState {
                entity: "escrow",
                status: "unfunded",
            })?;
            let escrow = state.escrows().fetch(key)?;

            let deadline_lapsed =
                self.clock.utc() > record.deadline() && escrow.released().is_zero();
            let permitted = matches!(
                record.status(),
                TaskStatus::Cancelled | TaskStatus::Disputed
            ) || deadline_lapsed;
            if !permitted {
                return Err(MarketError::RefundNotAllowed {
                    status: record.status().as_str(),
                });
            }

            let amount = state.escrows_mut().fetch_mut(key)?.record_refund()?;
            state.ledger_mut().release_from_vault(key, caller, amount)?;
            Ok(amount)
        })
    }

    /// Retrieves an escrow by key.
    ///
    /// Returns `Ok(None)` when no escrow exists at the key.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the store itself fails.
    pub fn find_escrow(&self, escrow: EscrowKey) -> MarketResult<Option<Escrow>> {
        self.store
            .read(|state| Ok(state.escrows().get(escrow).cloned()))
    }

    /// Returns `account`'s ledger balance; absent accounts hold zero.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the store itself fails.
    pub fn balance_of(&self, account: AgentId) -> MarketResult<Amount> {
        self.store.read(|state| Ok(state.ledger().balance_of(account)))
    }
}
