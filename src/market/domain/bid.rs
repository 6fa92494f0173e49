//! Bid aggregate: a competing offer against an open task.

use super::{AgentId, Amount, MarketError, MarketResult, Task, TaskKey, TaskStatus};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Bid lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    /// Awaiting a decision from the task owner.
    Pending,
    /// Chosen as the task's single winning bid.
    Accepted,
    /// Declined by the task owner.
    Rejected,
    /// Retracted by the bidder.
    Withdrawn,
}

impl BidStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Returns whether the status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Bid aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    task: TaskKey,
    bidder: AgentId,
    amount: Amount,
    timeline_secs: i64,
    proposal: String,
    status: BidStatus,
    created_at: DateTime<Utc>,
}

impl Bid {
    /// Maximum proposal length in characters.
    pub const MAX_PROPOSAL_LEN: usize = 2000;

    /// Creates a `Pending` bid against `task`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the task is not `Open`,
    /// and [`MarketError::Validation`] when the bidder is the task owner,
    /// the amount is zero or exceeds the task budget, the timeline is not
    /// strictly positive or extends past the task deadline, or the proposal
    /// exceeds 2000 characters.
    pub fn submit(
        task_key: TaskKey,
        task: &Task,
        bidder: AgentId,
        terms: BidTerms,
        clock: &impl Clock,
    ) -> MarketResult<Self> {
        if task.status() != TaskStatus::Open {
            return Err(MarketError::InvalidState {
                entity: "task",
                status: task.status().as_str(),
            });
        }
        if bidder == task.owner() {
            return Err(MarketError::validation(
                "bidder",
                "task owners may not bid on their own tasks",
            ));
        }
        if terms.amount.is_zero() {
            return Err(MarketError::validation("amount", "must be greater than 0"));
        }
        if terms.amount > task.budget() {
            return Err(MarketError::validation(
                "amount",
                format!("must not exceed the task budget of {}", task.budget()),
            ));
        }
        if terms.timeline <= TimeDelta::zero() {
            return Err(MarketError::validation(
                "timeline",
                "must be strictly positive",
            ));
        }
        let now = clock.utc();
        let finish_by = now
            .checked_add_signed(terms.timeline)
            .ok_or(MarketError::Overflow {
                operation: "projecting the bid timeline onto the calendar",
            })?;
        if finish_by > task.deadline() {
            return Err(MarketError::validation(
                "timeline",
                "must not extend past the task deadline",
            ));
        }
        if terms.proposal.chars().count() > Self::MAX_PROPOSAL_LEN {
            return Err(MarketError::validation(
                "proposal",
                format!("must be at most {} characters", Self::MAX_PROPOSAL_LEN),
            ));
        }

        Ok(Self {
            task: task_key,
            bidder,
            amount: terms.amount,
            timeline_secs: terms.timeline.num_seconds(),
            proposal: terms.proposal,
            status: BidStatus::Pending,
            created_at: now,
        })
    }

    /// Returns the key of the task the bid targets.
    #[must_use]
    pub const fn task(&self) -> TaskKey {
        self.task
    }

    /// Returns the bidder identity.
    #[must_use]
    pub const fn bidder(&self) -> AgentId {
        self.bidder
    }

    /// Returns the offered price.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Returns the proposed delivery timeline.
    #[must_use]
    pub const fn timeline(&self) -> TimeDelta {
        TimeDelta::seconds(self.timeline_secs)
    }

    /// Returns the proposal text.
    #[must_use]
    pub fn proposal(&self) -> &str {
        &self.proposal
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> BidStatus {
        self.status
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the bid as the task's accepted bid.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the bid is not `Pending`.
    pub fn accept(&mut self) -> MarketResult<()> {
        self.resolve(BidStatus::Accepted)
    }

    /// Declines the bid.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the bid is not `Pending`.
    pub fn reject(&mut self) -> MarketResult<()> {
        self.resolve(BidStatus::Rejected)
    }

    /// Retracts the bid.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the bid is not `Pending`.
    pub fn withdraw(&mut self) -> MarketResult<()> {
        self.resolve(BidStatus::Withdrawn)
    }

    fn resolve(&mut self, target: BidStatus) -> MarketResult<()> {
        if self.status.is_terminal() {
            return Err(MarketError::InvalidState {
                entity: "bid",
                status: self.status.as_str(),
            });
        }
        self.status = target;
        Ok(())
    }
}

/// Price, timeline, and proposal supplied with a bid submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidTerms {
    /// Offered price; at most the task budget.
    pub amount: Amount,
    /// Proposed delivery duration from submission time.
    pub timeline: TimeDelta,
    /// Free-form proposal, at most 2000 characters.
    pub proposal: String,
}

impl BidTerms {
    /// Creates bid terms.
    #[must_use]
    pub fn new(amount: Amount, timeline: TimeDelta, proposal: impl Into<String>) -> Self {
        Self {
            amount,
            timeline,
            proposal: proposal.into(),
        }
    }
}
