//! Agora: trustless task-marketplace state machine.
//!
//! This crate implements the transactional core of a task marketplace: owners
//! post tasks with milestone-split budgets, bidders compete for the work, the
//! owner accepts exactly one bid, and an escrow releases payment milestone by
//! milestone. Wallets, transport, and UI are external collaborators; callers
//! arrive as authenticated identities and every operation commits atomically
//! or not at all.
//!
//! # Architecture
//!
//! Agora follows hexagonal architecture principles:
//!
//! - **Domain**: Pure record types and state machines with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for transactional persistence
//! - **Adapters**: Concrete implementations of ports (in-memory store)
//!
//! # Modules
//!
//! - [`store`]: Deterministic record keys and the generic keyed record
//!   collection
//! - [`market`]: Marketplace entities, invariants, and operation services

pub mod market;
pub mod store;
