//! Port contracts for the marketplace core.
//!
//! Ports define infrastructure-agnostic interfaces used by the operation
//! services.

pub mod store;

pub use store::MarketStore;
