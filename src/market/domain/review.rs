//! Review aggregate: a one-shot rating tied to a completed task.

use super::{AgentId, MarketError, MarketResult, TaskKey};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated star rating in 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Creates a validated rating.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRating`] when the value is outside
    /// 1..=5.
    pub const fn new(value: u8) -> MarketResult<Self> {
        if value < Self::MIN || value > Self::MAX {
            return Err(MarketError::InvalidRating(value));
        }
        Ok(Self(value))
    }

    /// Returns the numeric rating.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Review aggregate.
///
/// One review exists per (task, reviewer) pair; the reviewee is always the
/// reviewer's counterpart on the task, derived by the service rather than
/// supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    reviewer: AgentId,
    reviewee: AgentId,
    task: TaskKey,
    rating: Rating,
    text: String,
    created_at: DateTime<Utc>,
}

impl Review {
    /// Maximum review text length in characters.
    pub const MAX_TEXT_LEN: usize = 1000;

    /// Creates a review of `reviewee` left by `reviewer` for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] when the text exceeds 1000
    /// characters.
    pub fn submit(
        task: TaskKey,
        reviewer: AgentId,
        reviewee: AgentId,
        rating: Rating,
        text: impl Into<String>,
        clock: &impl Clock,
    ) -> MarketResult<Self> {
        let body = text.into();
        if body.chars().count() > Self::MAX_TEXT_LEN {
            return Err(MarketError::validation(
                "review_text",
                format!("must be at most {} characters", Self::MAX_TEXT_LEN),
            ));
        }
        Ok(Self {
            reviewer,
            reviewee,
            task,
            rating,
            text: body,
            created_at: clock.utc(),
        })
    }

    /// Returns the reviewer's identity.
    #[must_use]
    pub const fn reviewer(&self) -> AgentId {
        self.reviewer
    }

    /// Returns the reviewee's identity.
    #[must_use]
    pub const fn reviewee(&self) -> AgentId {
        self.reviewee
    }

    /// Returns the reviewed task's key.
    #[must_use]
    pub const fn task(&self) -> TaskKey {
        self.task
    }

    /// Returns the rating.
    #[must_use]
    pub const fn rating(&self) -> Rating {
        self.rating
    }

    /// Returns the review text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
