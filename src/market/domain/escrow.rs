//! Escrow aggregate: custodial fund holding for one task.

use super::{AgentId, Amount, AssetId, MarketError, MarketResult, TaskKey};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Escrow aggregate.
///
/// `total` is fixed at funding time to the accepted bid's amount; `released`
/// and `refunded` only ever grow, and their sum never exceeds `total`. The
/// record is the sole source of truth for remaining custody: every release
/// and refund recomputes against the current on-record values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    task: TaskKey,
    client: AgentId,
    freelancer: AgentId,
    total: Amount,
    released: Amount,
    refunded: Amount,
    asset: AssetId,
    created_at: DateTime<Utc>,
}

impl Escrow {
    /// Opens an escrow holding `total` units for `task`.
    #[must_use]
    pub fn open(
        task: TaskKey,
        client: AgentId,
        freelancer: AgentId,
        total: Amount,
        asset: AssetId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            task,
            client,
            freelancer,
            total,
            released: Amount::ZERO,
            refunded: Amount::ZERO,
            asset,
            created_at: clock.utc(),
        }
    }

    /// Returns the funded task's key.
    #[must_use]
    pub const fn task(&self) -> TaskKey {
        self.task
    }

    /// Returns the client (task owner) identity.
    #[must_use]
    pub const fn client(&self) -> AgentId {
        self.client
    }

    /// Returns the freelancer (accepted bidder) identity.
    #[must_use]
    pub const fn freelancer(&self) -> AgentId {
        self.freelancer
    }

    /// Returns the total escrowed amount.
    #[must_use]
    pub const fn total(&self) -> Amount {
        self.total
    }

    /// Returns the amount released to the freelancer so far.
    #[must_use]
    pub const fn released(&self) -> Amount {
        self.released
    }

    /// Returns the amount refunded to the client so far.
    #[must_use]
    pub const fn refunded(&self) -> Amount {
        self.refunded
    }

    /// Returns the settlement asset identifier.
    #[must_use]
    pub const fn asset(&self) -> AssetId {
        self.asset
    }

    /// Returns the funding timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the custody still held: `total − released − refunded`.
    #[must_use]
    pub fn remaining(&self) -> Amount {
        self.disbursed()
            .and_then(|disbursed| self.total.checked_sub(disbursed))
            .unwrap_or(Amount::ZERO)
    }

    /// Records the release of `amount` to the freelancer.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InsufficientFunds`] when the remaining custody
    /// cannot cover `amount` and [`MarketError::Overflow`] when the released
    /// accumulator overflows.
    pub fn record_release(&mut self, amount: Amount) -> MarketResult<()> {
        let remaining = self.remaining();
        if amount > remaining {
            return Err(MarketError::InsufficientFunds {
                required: amount,
                available: remaining,
            });
        }
        self.released = self
            .released
            .checked_add(amount)
            .ok_or(MarketError::Overflow {
                operation: "accumulating released escrow funds",
            })?;
        Ok(())
    }

    /// Records a refund of all remaining custody to the client, returning
    /// the refunded amount.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NoFundsToRefund`] when nothing remains and
    /// [`MarketError::Overflow`] when the refunded accumulator overflows.
    pub fn record_refund(&mut self) -> MarketResult<Amount> {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Err(MarketError::NoFundsToRefund);
        }
        self.refunded = self
            .refunded
            .checked_add(remaining)
            .ok_or(MarketError::Overflow {
                operation: "accumulating refunded escrow funds",
            })?;
        Ok(remaining)
    }

    fn disbursed(&self) -> Option<Amount> {
        self.released.checked_add(self.refunded)
    }
}
