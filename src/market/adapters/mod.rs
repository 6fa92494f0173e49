//! Adapter implementations of the marketplace ports.

pub mod memory;

pub use memory::InMemoryMarketStore;
