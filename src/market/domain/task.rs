//! Task aggregate root: budgeted, milestone-split work posted by an owner.

use super::{AgentId, Amount, BidKey, EscrowKey, MarketError, MarketResult};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Posted and accepting bids.
    Open,
    /// A bid has been accepted; work is underway.
    InProgress,
    /// Every milestone has been paid.
    Completed,
    /// Withdrawn by the owner before any bid was accepted.
    Cancelled,
    /// Flagged for external dispute resolution.
    Disputed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Disputed => "disputed",
        }
    }

    /// Returns whether the status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns whether the state machine permits moving to `target`.
    ///
    /// The matrix is exhaustive; any pair it does not list is rejected.
    /// Dispute resolution happens outside the core, so `Disputed` admits no
    /// in-core transition despite not being terminal.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::InProgress | Self::Cancelled | Self::Disputed)
                | (Self::InProgress, Self::Completed | Self::Disputed)
        )
    }
}

/// Priced sub-deliverable of a task, addressed by its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    description: String,
    amount: Amount,
    completed: bool,
    paid: bool,
}

impl Milestone {
    /// Returns the milestone description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the milestone's payout amount.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Returns whether the freelancer has marked the milestone complete.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Returns whether the milestone's payout has been released.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        self.paid
    }
}

/// Milestone description and price supplied at task creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneDraft {
    /// Description of the sub-deliverable.
    pub description: String,
    /// Payout in the smallest currency unit.
    pub amount: Amount,
}

impl MilestoneDraft {
    /// Creates a milestone draft.
    #[must_use]
    pub fn new(description: impl Into<String>, amount: Amount) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// Validated inputs for posting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Short task title, 1–100 characters.
    pub title: String,
    /// Free-form description, at most 5000 characters.
    pub description: String,
    /// Total budget; must equal the sum of milestone amounts.
    pub budget: Amount,
    /// Ordered milestones, 1–10 entries.
    pub milestones: Vec<MilestoneDraft>,
    /// Absolute deadline; must be strictly in the future at posting.
    pub deadline: DateTime<Utc>,
}

/// Optional field updates applied to an `Open` task by its owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    description: Option<String>,
    budget: Option<Amount>,
    deadline: Option<DateTime<Utc>>,
}

impl TaskChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the task budget.
    ///
    /// Milestone amounts are not rebalanced here; a budget that no longer
    /// matches the milestone sum is rejected when a bid is accepted.
    #[must_use]
    pub const fn with_budget(mut self, budget: Amount) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Replaces the task deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Outcome of recording one milestone payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestonePayment {
    /// The amount released for the milestone.
    pub amount: Amount,
    /// Whether this payment was the last one, completing the task.
    pub task_completed: bool,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    owner: AgentId,
    title: String,
    description: String,
    budget: Amount,
    milestones: Vec<Milestone>,
    deadline: DateTime<Utc>,
    status: TaskStatus,
    accepted_bid: Option<BidKey>,
    escrow: Option<EscrowKey>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Maximum title length in characters.
    pub const MAX_TITLE_LEN: usize = 100;
    /// Maximum description length in characters.
    pub const MAX_DESCRIPTION_LEN: usize = 5000;
    /// Maximum number of milestones per task.
    pub const MAX_MILESTONES: usize = 10;
    /// Maximum milestone description length in characters.
    pub const MAX_MILESTONE_DESCRIPTION_LEN: usize = 200;

    /// Creates an `Open` task from a validated draft.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] when the title is empty or over
    /// 100 characters, the description exceeds 5000 characters, the
    /// milestone list is empty or longer than 10, any milestone is zero
    /// priced or over-described, the milestone amounts do not sum to the
    /// budget, or the deadline is not strictly in the future. Returns
    /// [`MarketError::Overflow`] when the milestone sum overflows.
    pub fn post(owner: AgentId, draft: TaskDraft, clock: &impl Clock) -> MarketResult<Self> {
        validate_title(&draft.title)?;
        validate_description(&draft.description)?;
        let milestones = validate_milestones(draft.milestones, draft.budget)?;

        let now = clock.utc();
        if draft.deadline <= now {
            return Err(MarketError::validation(
                "deadline",
                "must be strictly in the future",
            ));
        }

        Ok(Self {
            owner,
            title: draft.title,
            description: draft.description,
            budget: draft.budget,
            milestones,
            deadline: draft.deadline,
            status: TaskStatus::Open,
            accepted_bid: None,
            escrow: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the owner identity.
    #[must_use]
    pub const fn owner(&self) -> AgentId {
        self.owner
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task budget.
    ///
    /// After a bid is accepted this is the agreed price rather than the
    /// originally posted figure.
    #[must_use]
    pub const fn budget(&self) -> Amount {
        self.budget
    }

    /// Returns the ordered milestone sequence.
    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Returns the milestone at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidMilestoneIndex`] when the index is out
    /// of range.
    pub fn milestone(&self, index: usize) -> MarketResult<&Milestone> {
        let count = self.milestones.len();
        self.milestones
            .get(index)
            .ok_or(MarketError::InvalidMilestoneIndex { index, count })
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the accepted bid's key, if a bid has been accepted.
    #[must_use]
    pub const fn accepted_bid(&self) -> Option<BidKey> {
        self.accepted_bid
    }

    /// Returns the escrow key, once the task has been funded.
    #[must_use]
    pub const fn escrow(&self) -> Option<EscrowKey> {
        self.escrow
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies owner-supplied field updates while the task is `Open`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the task is not `Open` and
    /// [`MarketError::Validation`] when a supplied field fails validation.
    pub fn apply_changes(&mut self, changes: TaskChanges, clock: &impl Clock) -> MarketResult<()> {
        self.ensure_status(TaskStatus::Open)?;

        if let Some(description) = changes.description {
            validate_description(&description)?;
            self.description = description;
        }
        if let Some(budget) = changes.budget {
            if budget.is_zero() {
                return Err(MarketError::validation("budget", "must be greater than 0"));
            }
            self.budget = budget;
        }
        if let Some(deadline) = changes.deadline {
            if deadline <= clock.utc() {
                return Err(MarketError::validation(
                    "deadline",
                    "must be strictly in the future",
                ));
            }
            self.deadline = deadline;
        }

        self.touch(clock);
        Ok(())
    }

    /// Cancels the task; permitted only while `Open`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the task is not `Open`.
    pub fn cancel(&mut self, clock: &impl Clock) -> MarketResult<()> {
        self.ensure_status(TaskStatus::Open)?;
        self.transition(TaskStatus::Cancelled, clock)
    }

    /// Flags the task as disputed; permitted from any non-terminal status.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the task is terminal or
    /// already disputed.
    pub fn flag_dispute(&mut self, clock: &impl Clock) -> MarketResult<()> {
        self.transition(TaskStatus::Disputed, clock)
    }

    /// Records bid acceptance: the task moves to `InProgress` and its
    /// milestones are re-priced to the agreed amount.
    ///
    /// Milestone amounts are floor-scaled proportionally with a floor of one
    /// unit each, and the final milestone absorbs the rounding remainder, so
    /// the sequence sums to exactly `agreed` and later equals the escrow
    /// total once funded. The budget becomes the agreed price.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the task is not `Open`,
    /// [`MarketError::Validation`] when the budget no longer matches the
    /// milestone sum or the agreed price cannot give every milestone a
    /// positive amount, and arithmetic errors when re-pricing overflows.
    pub fn record_acceptance(
        &mut self,
        bid: BidKey,
        agreed: Amount,
        clock: &impl Clock,
    ) -> MarketResult<()> {
        self.ensure_status(TaskStatus::Open)?;
        self.rescale_milestones(agreed)?;
        self.budget = agreed;
        self.accepted_bid = Some(bid);
        self.transition(TaskStatus::InProgress, clock)
    }

    /// Attaches the escrow funding this task.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the task is not
    /// `InProgress` or an escrow is already attached.
    pub fn attach_escrow(&mut self, escrow: EscrowKey, clock: &impl Clock) -> MarketResult<()> {
        self.ensure_status(TaskStatus::InProgress)?;
        if self.escrow.is_some() {
            return Err(MarketError::InvalidState {
                entity: "task",
                status: "already funded",
            });
        }
        self.escrow = Some(escrow);
        self.touch(clock);
        Ok(())
    }

    /// Marks the milestone at `index` as completed.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the task is not
    /// `InProgress` or the milestone is already completed, and
    /// [`MarketError::InvalidMilestoneIndex`] for an out-of-range index.
    pub fn complete_milestone(&mut self, index: usize, clock: &impl Clock) -> MarketResult<()> {
        self.ensure_status(TaskStatus::InProgress)?;
        let count = self.milestones.len();
        let milestone = self
            .milestones
            .get_mut(index)
            .ok_or(MarketError::InvalidMilestoneIndex { index, count })?;
        if milestone.completed {
            return Err(MarketError::InvalidState {
                entity: "milestone",
                status: "completed",
            });
        }
        milestone.completed = true;
        self.touch(clock);
        Ok(())
    }

    /// Marks the milestone at `index` as paid and reports its amount.
    ///
    /// Paying the last unpaid milestone transitions the task to `Completed`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidState`] when the task is not
    /// `InProgress`, [`MarketError::InvalidMilestoneIndex`] for an
    /// out-of-range index, [`MarketError::MilestoneNotCompleted`] when the
    /// milestone has not been completed, and
    /// [`MarketError::MilestoneAlreadyPaid`] when it was already paid.
    pub fn record_milestone_payment(
        &mut self,
        index: usize,
        clock: &impl Clock,
    ) -> MarketResult<MilestonePayment> {
        self.ensure_status(TaskStatus::InProgress)?;
        let count = self.milestones.len();
        let milestone = self
            .milestones
            .get_mut(index)
            .ok_or(MarketError::InvalidMilestoneIndex { index, count })?;
        if !milestone.completed {
            return Err(MarketError::MilestoneNotCompleted { index });
        }
        if milestone.paid {
            return Err(MarketError::MilestoneAlreadyPaid { index });
        }
        milestone.paid = true;
        let amount = milestone.amount;

        let task_completed = self.milestones.iter().all(Milestone::is_paid);
        if task_completed {
            self.transition(TaskStatus::Completed, clock)?;
        } else {
            self.touch(clock);
        }
        Ok(MilestonePayment {
            amount,
            task_completed,
        })
    }

    fn ensure_status(&self, required: TaskStatus) -> MarketResult<()> {
        if self.status == required {
            return Ok(());
        }
        Err(MarketError::InvalidState {
            entity: "task",
            status: self.status.as_str(),
        })
    }

    fn transition(&mut self, target: TaskStatus, clock: &impl Clock) -> MarketResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(MarketError::InvalidState {
                entity: "task",
                status: self.status.as_str(),
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    fn rescale_milestones(&mut self, agreed: Amount) -> MarketResult<()> {
        let posted = Amount::checked_sum(self.milestones.iter().map(Milestone::amount)).ok_or(
            MarketError::Overflow {
                operation: "summing milestone amounts",
            },
        )?;
        if posted != self.budget {
            return Err(MarketError::validation(
                "budget",
                format!(
                    "budget of {} does not match milestone amounts summing to {posted}",
                    self.budget
                ),
            ));
        }

        let count = self.milestones.len();
        let mut allocated = Amount::ZERO;
        for (position, milestone) in self.milestones.iter_mut().enumerate() {
            let share = if position + 1 == count {
                agreed
                    .checked_sub(allocated)
                    .filter(|remainder| !remainder.is_zero())
                    .ok_or_else(|| {
                        MarketError::validation(
                            "amount",
                            "agreed price cannot give every milestone a positive amount",
                        )
                    })?
            } else {
                scale_share(milestone.amount, agreed, posted)?.max(Amount::new(1))
            };
            milestone.amount = share;
            allocated = allocated.checked_add(share).ok_or(MarketError::Overflow {
                operation: "re-pricing milestones to the agreed amount",
            })?;
        }
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

/// Floor-scales one milestone amount from the posted budget to the agreed
/// price.
#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "proportional split uses floor division; the final milestone absorbs the remainder"
)]
fn scale_share(amount: Amount, agreed: Amount, posted: Amount) -> MarketResult<Amount> {
    let scaled = u128::from(amount.value()) * u128::from(agreed.value()) / u128::from(posted.value());
    u64::try_from(scaled)
        .map(Amount::new)
        .map_err(|_| MarketError::Overflow {
            operation: "re-pricing milestones to the agreed amount",
        })
}

fn validate_title(title: &str) -> MarketResult<()> {
    if title.is_empty() {
        return Err(MarketError::validation("title", "must not be empty"));
    }
    if title.chars().count() > Task::MAX_TITLE_LEN {
        return Err(MarketError::validation(
            "title",
            format!("must be at most {} characters", Task::MAX_TITLE_LEN),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> MarketResult<()> {
    if description.chars().count() > Task::MAX_DESCRIPTION_LEN {
        return Err(MarketError::validation(
            "description",
            format!("must be at most {} characters", Task::MAX_DESCRIPTION_LEN),
        ));
    }
    Ok(())
}

fn validate_milestones(
    drafts: Vec<MilestoneDraft>,
    budget: Amount,
) -> MarketResult<Vec<Milestone>> {
    if drafts.is_empty() {
        return Err(MarketError::validation(
            "milestones",
            "must contain at least one entry",
        ));
    }
    if drafts.len() > Task::MAX_MILESTONES {
        return Err(MarketError::validation(
            "milestones",
            format!("must contain at most {} entries", Task::MAX_MILESTONES),
        ));
    }

    let total = Amount::checked_sum(drafts.iter().map(|draft| draft.amount)).ok_or(
        MarketError::Overflow {
            operation: "summing milestone amounts",
        },
    )?;
    if total != budget {
        return Err(MarketError::validation(
            "milestones",
            format!("amounts sum to {total}, expected the budget of {budget}"),
        ));
    }

    drafts.into_iter().map(build_milestone).collect()
}

fn build_milestone(draft: MilestoneDraft) -> MarketResult<Milestone> {
    if draft.amount.is_zero() {
        return Err(MarketError::validation(
            "milestones",
            "every milestone amount must be greater than 0",
        ));
    }
    if draft.description.chars().count() > Task::MAX_MILESTONE_DESCRIPTION_LEN {
        return Err(MarketError::validation(
            "milestones",
            format!(
                "milestone descriptions must be at most {} characters",
                Task::MAX_MILESTONE_DESCRIPTION_LEN
            ),
        ));
    }
    Ok(Milestone {
        description: draft.description,
        amount: draft.amount,
        completed: false,
        paid: false,
    })
}
