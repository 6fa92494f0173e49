//! Marketplace bounded context: tasks, bids, escrows, profiles, reviews.
//!
//! Owners post milestone-split tasks, bidders compete, the owner accepts
//! exactly one bid, and an escrow pays the work out milestone by milestone.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Committed state and the asset ledger in [`state`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod state;

#[cfg(test)]
mod tests;
