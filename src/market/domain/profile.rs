//! Agent profile aggregate: per-identity reputation and financial history.

use super::{AgentId, Amount, MarketError, MarketResult, Rating};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated display name, 1–50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileName(String);

impl ProfileName {
    /// Maximum name length in characters.
    pub const MAX_LEN: usize = 50;

    /// Creates a validated profile name.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] when the name is empty or longer
    /// than 50 characters.
    pub fn new(value: impl Into<String>) -> MarketResult<Self> {
        let name = value.into();
        if name.is_empty() {
            return Err(MarketError::validation("name", "must not be empty"));
        }
        if name.chars().count() > Self::MAX_LEN {
            return Err(MarketError::validation(
                "name",
                format!("must be at most {} characters", Self::MAX_LEN),
            ));
        }
        Ok(Self(name))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProfileName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Agent profile aggregate.
///
/// Counters are mutated only as side effects of task, escrow, and review
/// operations; callers never set them directly. Operations on identities
/// without a profile simply skip the side effect, so the profile ledger
/// never gates a marketplace transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    owner: AgentId,
    name: ProfileName,
    tasks_posted: u32,
    tasks_completed: u32,
    total_earned: Amount,
    total_spent: Amount,
    rating_sum: u32,
    rating_count: u32,
    created_at: DateTime<Utc>,
}

impl AgentProfile {
    /// Creates a profile for `owner` with all counters at zero.
    #[must_use]
    pub fn initialize(owner: AgentId, name: ProfileName, clock: &impl Clock) -> Self {
        Self {
            owner,
            name,
            tasks_posted: 0,
            tasks_completed: 0,
            total_earned: Amount::ZERO,
            total_spent: Amount::ZERO,
            rating_sum: 0,
            rating_count: 0,
            created_at: clock.utc(),
        }
    }

    /// Returns the profile owner's identity.
    #[must_use]
    pub const fn owner(&self) -> AgentId {
        self.owner
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &ProfileName {
        &self.name
    }

    /// Returns the number of tasks the agent has posted.
    #[must_use]
    pub const fn tasks_posted(&self) -> u32 {
        self.tasks_posted
    }

    /// Returns the number of tasks the agent has seen through to completion.
    #[must_use]
    pub const fn tasks_completed(&self) -> u32 {
        self.tasks_completed
    }

    /// Returns the total earned across all tasks.
    #[must_use]
    pub const fn total_earned(&self) -> Amount {
        self.total_earned
    }

    /// Returns the total spent across all tasks.
    #[must_use]
    pub const fn total_spent(&self) -> Amount {
        self.total_spent
    }

    /// Returns the sum of ratings received.
    #[must_use]
    pub const fn rating_sum(&self) -> u32 {
        self.rating_sum
    }

    /// Returns the number of ratings received.
    #[must_use]
    pub const fn rating_count(&self) -> u32 {
        self.rating_count
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Counts a newly posted task.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Overflow`] when the counter overflows.
    pub fn record_task_posted(&mut self) -> MarketResult<()> {
        self.tasks_posted = checked_increment(self.tasks_posted, "counting posted tasks")?;
        Ok(())
    }

    /// Counts a task carried through to completion.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Overflow`] when the counter overflows.
    pub fn record_task_completed(&mut self) -> MarketResult<()> {
        self.tasks_completed = checked_increment(self.tasks_completed, "counting completed tasks")?;
        Ok(())
    }

    /// Accumulates released payment received as a freelancer.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Overflow`] when the accumulator overflows.
    pub fn record_earned(&mut self, amount: Amount) -> MarketResult<()> {
        self.total_earned = self
            .total_earned
            .checked_add(amount)
            .ok_or(MarketError::Overflow {
                operation: "accumulating earnings",
            })?;
        Ok(())
    }

    /// Accumulates released payment spent as a client.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Overflow`] when the accumulator overflows.
    pub fn record_spent(&mut self, amount: Amount) -> MarketResult<()> {
        self.total_spent = self
            .total_spent
            .checked_add(amount)
            .ok_or(MarketError::Overflow {
                operation: "accumulating spending",
            })?;
        Ok(())
    }

    /// Accumulates a received rating.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Overflow`] when either accumulator overflows.
    pub fn record_rating(&mut self, rating: Rating) -> MarketResult<()> {
        self.rating_sum = self
            .rating_sum
            .checked_add(u32::from(rating.value()))
            .ok_or(MarketError::Overflow {
                operation: "accumulating ratings",
            })?;
        self.rating_count = checked_increment(self.rating_count, "counting ratings")?;
        Ok(())
    }
}

fn checked_increment(counter: u32, operation: &'static str) -> MarketResult<u32> {
    counter
        .checked_add(1)
        .ok_or(MarketError::Overflow { operation })
}
