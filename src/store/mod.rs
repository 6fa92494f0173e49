//! Generic keyed record persistence for the marketplace.
//!
//! Every marketplace entity lives in a [`Records`] collection addressed by a
//! deterministic [`RecordKey`] derived from stable inputs. Uniqueness rules
//! (one profile per identity, one bid per task/bidder pair, one review per
//! task/reviewer pair) fall out of the key derivation: creating a record whose
//! key is already occupied fails with [`RecordError::Duplicate`], so no
//! auxiliary uniqueness index is needed.

mod key;
mod records;

pub use key::RecordKey;
pub use records::{RecordError, RecordResult, Records};

#[cfg(test)]
mod tests;
