//! Service layer for task posting and lifecycle control.

use super::{apply_profile_effect, ensure_caller};
use crate::market::domain::{
    AgentId, AgentProfile, Bid, MarketError, MarketResult, Task, TaskChanges, TaskDraft, TaskKey,
};
use crate::market::ports::MarketStore;
use mockable::Clock;
use std::sync::Arc;

/// Request payload for posting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTaskRequest {
    /// Caller-chosen discriminator between the owner's own tasks.
    pub nonce: u64,
    /// The task's validated-on-post content.
    pub draft: TaskDraft,
}

impl PostTaskRequest {
    /// Creates a post request.
    #[must_use]
    pub const fn new(nonce: u64, draft: TaskDraft) -> Self {
        Self { nonce, draft }
    }
}

/// Task posting and lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TaskService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Posts a new `Open` task owned by `caller` and returns its key.
    ///
    /// Bumps the owner's posted-task counter when they hold a profile.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] when the draft fails validation
    /// and [`MarketError::DuplicateRecord`] when the caller has already used
    /// the nonce.
    pub fn post_task(&self, caller: AgentId, request: PostTaskRequest) -> MarketResult<TaskKey> {
        let key = TaskKey::derive(caller, request.nonce);
        self.store.transact(|state| {
            let task = Task::post(caller, request.draft, &*self.clock)?;
            state.tasks_mut().create(key, task)?;
            apply_profile_effect(state, caller, AgentProfile::record_task_posted)?;
            Ok(key)
        })
    }

    /// Applies owner-supplied field updates to an `Open` task.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::RecordNotFound`] for an unknown key,
    /// [`MarketError::Unauthorized`] when the caller is not the owner,
    /// [`MarketError::InvalidState`] when the task is not `Open`, and
    /// [`MarketError::Validation`] when a supplied field fails validation.
    pub fn update_task(
        &self,
        caller: AgentId,
        task: TaskKey,
        changes: TaskChanges,
    ) -> MarketResult<()> {
        self.store.transact(|state| {
            let record = state.tasks_mut().fetch_mut(task)?;
            ensure_caller(record.owner(), caller, "update this task")?;
            record.apply_changes(changes, &*self.clock)
        })
    }

    /// Cancels an `Open` task.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::RecordNotFound`] for an unknown key,
    /// [`MarketError::Unauthorized`] when the caller is not the owner, and
    /// [`MarketError::InvalidState`] when the task is not `Open`.
    pub fn cancel_task(&self, caller: AgentId, task: TaskKey) -> MarketResult<()> {
        self.store.transact(|state| {
            let record = state.tasks_mut().fetch_mut(task)?;
            ensure_caller(record.owner(), caller, "cancel this task")?;
            record.cancel(&*self.clock)
        })
    }

    /// Flags a task as disputed.
    ///
    /// Either party may raise the dispute: the owner, or the accepted
    /// bidder once a bid has been accepted.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::RecordNotFound`] for an unknown key,
    /// [`MarketError::Unauthorized`] when the caller is neither party, and
    /// [`MarketError::InvalidState`] when the task is terminal or already
    /// disputed.
    pub fn dispute_task(&self, caller: AgentId, task: TaskKey) -> MarketResult<()> {
        self.store.transact(|state| {
            let record = state.tasks().fetch(task)?;
            let freelancer = record
                .accepted_bid()
                .map(|bid| state.bids().fetch(bid).map(Bid::bidder))
                .transpose()?;
            if caller != record.owner() && Some(caller) != freelancer {
                return Err(MarketError::Unauthorized {
                    caller,
                    action: "dispute this task",
                });
            }
            state.tasks_mut().fetch_mut(task)?.flag_dispute(&*self.clock)
        })
    }

    /// Retrieves a task by key.
    ///
    /// Returns `Ok(None)` when no task exists at the key.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Store`] when the store itself fails.
    pub fn find_task(&self, task: TaskKey) -> MarketResult<Option<Task>> {
        self.store.read(|state| Ok(state.tasks().get(task).cloned()))
    }
}
