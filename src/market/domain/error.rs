//! Error taxonomy for marketplace operations.

use super::{AgentId, Amount};
use crate::store::{RecordError, RecordKey};
use thiserror::Error;

/// Result type for marketplace operations.
pub type MarketResult<T> = Result<T, MarketError>;

/// Typed failure of a marketplace operation.
///
/// Every precondition violation aborts the whole transaction with no partial
/// mutation; each variant carries the offending detail so the caller can
/// decide whether to resubmit with corrected arguments or abandon.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarketError {
    /// An input failed length, emptiness, or range validation.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// The offending input field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The caller is not the required identity for the operation.
    #[error("caller {caller} may not {action}")]
    Unauthorized {
        /// The rejected caller.
        caller: AgentId,
        /// The attempted action.
        action: &'static str,
    },

    /// The operation is not permitted from the entity's current status.
    #[error("operation not permitted while {entity} is {status}")]
    InvalidState {
        /// The entity whose status blocked the operation.
        entity: &'static str,
        /// The entity's current status.
        status: &'static str,
    },

    /// A record already occupies the key where creation was attempted.
    #[error("record already exists at key {0}")]
    DuplicateRecord(RecordKey),

    /// A referenced record does not exist.
    #[error("no record exists at key {0}")]
    RecordNotFound(RecordKey),

    /// The milestone index is outside the task's milestone sequence.
    #[error("milestone index {index} out of range for {count} milestones")]
    InvalidMilestoneIndex {
        /// The rejected index.
        index: usize,
        /// The task's milestone count.
        count: usize,
    },

    /// Payment was requested for a milestone not yet completed.
    #[error("milestone {index} is not completed")]
    MilestoneNotCompleted {
        /// The milestone's index.
        index: usize,
    },

    /// Payment was requested for a milestone already paid.
    #[error("milestone {index} is already paid")]
    MilestoneAlreadyPaid {
        /// The milestone's index.
        index: usize,
    },

    /// The payer's account cannot cover the required amount.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// The amount the operation needed.
        required: Amount,
        /// The payer's current balance.
        available: Amount,
    },

    /// No refund condition holds for the task's current status.
    #[error("refund not allowed while task is {status}")]
    RefundNotAllowed {
        /// The task's current status.
        status: &'static str,
    },

    /// The escrow holds nothing left to refund.
    #[error("no funds remain to refund")]
    NoFundsToRefund,

    /// The rating is outside the accepted 1..=5 range.
    #[error("rating {0} is outside 1..=5")]
    InvalidRating(u8),

    /// A balance addition would overflow.
    #[error("arithmetic overflow while {operation}")]
    Overflow {
        /// The operation being computed.
        operation: &'static str,
    },

    /// A balance subtraction would underflow.
    #[error("arithmetic underflow while {operation}")]
    Underflow {
        /// The operation being computed.
        operation: &'static str,
    },

    /// The store itself failed (e.g. a poisoned lock).
    #[error("store failure: {0}")]
    Store(String),
}

impl From<RecordError> for MarketError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Duplicate(key) => Self::DuplicateRecord(key),
            RecordError::NotFound(key) => Self::RecordNotFound(key),
        }
    }
}

impl MarketError {
    /// Builds a validation error for `field`.
    #[must_use]
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
