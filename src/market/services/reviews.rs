//! Service layer for post-completion reviews.

use super::apply_profile_effect;
use crate::market::domain::{
    AgentId, MarketError, MarketResult, Rating, Review, ReviewKey, TaskKey, TaskStatus,
};
use crate::market::ports::MarketStore;
use mockable::Clock;
use std::sync::Arc;

/// Request payload for submitting a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReviewRequest {
    /// Star rating, 1..=5.
    pub rating: u8,
    /// Free-form review text, at most 1000 characters.
    pub text: String,
}

impl SubmitReviewRequest {
    /// Creates a review request.
    #[must_use]
    pub fn new(rating: u8, text: impl Into<String>) -> Self {
        Self {
            rating,
            text: text.into(),
        }
    }
}

/// Review submission and lookup service.
#[derive(Clone)]
pub struct ReviewService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ReviewService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    /// Creates a new review service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Submits `caller`'s review of their counterpart on a completed task
    /// and returns its key.
    ///
    /// The reviewee is derived, never supplied: the client reviews the
    /// freelancer and the freelancer reviews the client. Each party gets one
    /// review per task; the reviewee's rating accumulators move only when
    /// they hold a profile.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for an unknown task, `InvalidState` when the
    /// task is not `Completed`, `Unauthorized` when the caller is neither
    /// party, `InvalidRating` for a rating outside 1..=5, `Validation` when
    /// the text exceeds 1000 characters, and `DuplicateRecord` when the
    /// caller has already reviewed the task.
    pub fn submit_review(
        &self,
        caller: AgentId,
        task: TaskKey,
        request: SubmitReviewRequest,
    ) -> MarketResult<ReviewKey> {
        let key = ReviewKey::derive(task, caller);
        let rating = Rating::new(request.rating)?;
        self.store.transact(|state| {
            let record = state.tasks().fetch(task)?;
            if record.status() != TaskStatus::Completed {
                return Err(MarketError::InvalidState {
                    entity: "task",
                    status: record.status().as_str(),
                });
            }
            let bid = record.accepted_bid().ok_or_else(|| MarketError::InvalidState {
                entity: "task",
                status: record.status().as_str(),
            })?;
            let freelancer = state.bids().fetch(bid)?.bidder();
            let client = record.owner();
            let reviewee = if caller == client {
                freelancer
            } else if caller == freelancer {
                client
            } else {
                return Err(MarketError::Unauthorized {
                    caller,
                    action: "review this task",
                });
            };

            let review = Review::submit(task, caller, reviewee, rating, request.text, &*self.clock)?;
            state.reviews_mut().create(key, review)?;
            apply_profile_effect(state, reviewee, |profile| profile.record_rating(rating))?;
            Ok(key)
        })
    }

    /// Retrieves a review by key.
    ///
    /// Returns `Ok(None)` when no review exists at the key.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the store itself fails.
    pub fn find_review(&self, review: ReviewKey) -> MarketResult<Option<Review>> {
        self.store
            .read(|state| Ok(state.reviews().get(review).cloned()))
    }
}
