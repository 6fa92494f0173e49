//! Domain model for the task marketplace.
//!
//! The domain owns the record types, their validation rules, and the status
//! state machines; infrastructure concerns stay outside this boundary.
//! Services enforce caller authorization, aggregates enforce state rules, and
//! every monetary mutation is checked arithmetic that fails closed.

mod bid;
mod error;
mod escrow;
mod ids;
mod money;
mod profile;
mod review;
mod task;

pub use bid::{Bid, BidStatus, BidTerms};
pub use error::{MarketError, MarketResult};
pub use escrow::Escrow;
pub use ids::{AgentId, AssetId, BidKey, EscrowKey, ProfileKey, ReviewKey, TaskKey};
pub use money::Amount;
pub use profile::{AgentProfile, ProfileName};
pub use review::{Rating, Review};
pub use task::{
    Milestone, MilestoneDraft, MilestonePayment, Task, TaskChanges, TaskDraft, TaskStatus,
};
