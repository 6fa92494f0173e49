//! Application services for marketplace operations.
//!
//! Each service wraps one entity family's operations in store transactions:
//! authorization and cross-record checks run inside the transaction closure
//! so they always see the latest committed state.

mod bids;
mod escrows;
mod profiles;
mod reviews;
mod tasks;

pub use bids::BidService;
pub use escrows::EscrowService;
pub use profiles::ProfileService;
pub use reviews::{ReviewService, SubmitReviewRequest};
pub use tasks::{PostTaskRequest, TaskService};

use crate::market::domain::{AgentId, AgentProfile, MarketError, MarketResult, ProfileKey};
use crate::market::state::MarketState;

/// Rejects callers other than the required identity.
pub(crate) fn ensure_caller(
    required: AgentId,
    caller: AgentId,
    action: &'static str,
) -> MarketResult<()> {
    if caller == required {
        return Ok(());
    }
    Err(MarketError::Unauthorized { caller, action })
}

/// Applies a profile counter mutation if `agent` has a profile.
///
/// Identities without a profile skip the side effect; the profile ledger
/// never gates a marketplace transition.
pub(crate) fn apply_profile_effect(
    state: &mut MarketState,
    agent: AgentId,
    effect: impl FnOnce(&mut AgentProfile) -> MarketResult<()>,
) -> MarketResult<()> {
    state
        .profiles_mut()
        .get_mut(ProfileKey::derive(agent))
        .map_or(Ok(()), effect)
}
