//! Tests for validated scalars, status machines, and key derivation.

use crate::market::domain::{
    AgentId, Amount, AssetId, BidKey, BidStatus, Escrow, EscrowKey, MarketError, ProfileKey,
    ProfileName, Rating, ReviewKey, TaskKey, TaskStatus,
};
use crate::market::tests::support::{self, FixedClock};
use eyre::ensure;
use rstest::rstest;

#[rstest]
fn amount_checked_add_detects_overflow() {
    let max = Amount::new(u64::MAX);
    assert_eq!(max.checked_add(Amount::new(1)), None);
    assert_eq!(
        Amount::new(40).checked_add(Amount::new(2)),
        Some(Amount::new(42))
    );
}

#[rstest]
fn amount_checked_sub_detects_underflow() {
    assert_eq!(Amount::new(1).checked_sub(Amount::new(2)), None);
    assert_eq!(
        Amount::new(2).checked_sub(Amount::new(2)),
        Some(Amount::ZERO)
    );
}

#[rstest]
fn amount_checked_sum_folds_and_detects_overflow() {
    let total = Amount::checked_sum([Amount::new(200), Amount::new(500), Amount::new(300)]);
    assert_eq!(total, Some(Amount::new(1000)));

    let overflowing = Amount::checked_sum([Amount::new(u64::MAX), Amount::new(1)]);
    assert_eq!(overflowing, None);
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(3, true)]
#[case(5, true)]
#[case(6, false)]
fn rating_accepts_only_one_through_five(#[case] value: u8, #[case] accepted: bool) {
    let result = Rating::new(value);
    if accepted {
        assert_eq!(result.map(Rating::value), Ok(value));
    } else {
        assert_eq!(result, Err(MarketError::InvalidRating(value)));
    }
}

#[rstest]
fn profile_name_rejects_empty_and_oversized_values() {
    assert!(ProfileName::new("").is_err());
    assert!(ProfileName::new("b".repeat(51)).is_err());

    let name = ProfileName::new("b".repeat(50));
    assert!(name.is_ok_and(|valid| valid.as_str().len() == 50));
}

#[rstest]
#[case(TaskStatus::Open, TaskStatus::InProgress, true)]
#[case(TaskStatus::Open, TaskStatus::Cancelled, true)]
#[case(TaskStatus::Open, TaskStatus::Disputed, true)]
#[case(TaskStatus::Open, TaskStatus::Completed, false)]
#[case(TaskStatus::Open, TaskStatus::Open, false)]
#[case(TaskStatus::InProgress, TaskStatus::Completed, true)]
#[case(TaskStatus::InProgress, TaskStatus::Disputed, true)]
#[case(TaskStatus::InProgress, TaskStatus::Open, false)]
#[case(TaskStatus::InProgress, TaskStatus::Cancelled, false)]
#[case(TaskStatus::Completed, TaskStatus::Disputed, false)]
#[case(TaskStatus::Cancelled, TaskStatus::Open, false)]
#[case(TaskStatus::Disputed, TaskStatus::Completed, false)]
#[case(TaskStatus::Disputed, TaskStatus::InProgress, false)]
fn task_status_transition_matrix(
    #[case] from: TaskStatus,
    #[case] to: TaskStatus,
    #[case] permitted: bool,
) {
    assert_eq!(from.can_transition_to(to), permitted);
}

#[rstest]
fn task_status_terminality() {
    assert!(TaskStatus::Completed.is_terminal());
    assert!(TaskStatus::Cancelled.is_terminal());
    assert!(!TaskStatus::Open.is_terminal());
    assert!(!TaskStatus::InProgress.is_terminal());
    assert!(!TaskStatus::Disputed.is_terminal());
}

#[rstest]
#[case(BidStatus::Pending, false)]
#[case(BidStatus::Accepted, true)]
#[case(BidStatus::Rejected, true)]
#[case(BidStatus::Withdrawn, true)]
fn bid_status_terminality(#[case] status: BidStatus, #[case] terminal: bool) {
    assert_eq!(status.is_terminal(), terminal);
}

#[rstest]
fn typed_keys_derive_deterministically() {
    let owner = AgentId::new();
    assert_eq!(TaskKey::derive(owner, 7), TaskKey::derive(owner, 7));
    assert_ne!(TaskKey::derive(owner, 7), TaskKey::derive(owner, 8));
    assert_ne!(TaskKey::derive(owner, 7), TaskKey::derive(AgentId::new(), 7));
}

#[rstest]
fn typed_keys_separate_by_participant() {
    let owner = AgentId::new();
    let task = TaskKey::derive(owner, 1);
    let bidder_a = AgentId::new();
    let bidder_b = AgentId::new();

    assert_ne!(BidKey::derive(task, bidder_a), BidKey::derive(task, bidder_b));
    assert_ne!(
        ReviewKey::derive(task, bidder_a),
        ReviewKey::derive(task, bidder_b)
    );
    assert_eq!(EscrowKey::derive(task), EscrowKey::derive(task));
    assert_eq!(ProfileKey::derive(owner), ProfileKey::derive(owner));
}

#[rstest]
fn escrow_tracks_releases_against_remaining_custody() -> eyre::Result<()> {
    let clock = FixedClock::at(support::base_time());
    let task = TaskKey::derive(AgentId::new(), 1);
    let mut escrow = Escrow::open(
        task,
        AgentId::new(),
        AgentId::new(),
        Amount::new(900),
        AssetId::new(),
        &clock,
    );

    escrow.record_release(Amount::new(300))?;
    ensure!(escrow.released() == Amount::new(300));
    ensure!(escrow.remaining() == Amount::new(600));

    let over = escrow.record_release(Amount::new(601));
    ensure!(
        over == Err(MarketError::InsufficientFunds {
            required: Amount::new(601),
            available: Amount::new(600),
        })
    );
    Ok(())
}

#[rstest]
fn escrow_refunds_exactly_the_remainder_once() -> eyre::Result<()> {
    let clock = FixedClock::at(support::base_time());
    let task = TaskKey::derive(AgentId::new(), 1);
    let mut escrow = Escrow::open(
        task,
        AgentId::new(),
        AgentId::new(),
        Amount::new(900),
        AssetId::new(),
        &clock,
    );
    escrow.record_release(Amount::new(250))?;

    let refunded = escrow.record_refund()?;
    ensure!(refunded == Amount::new(650));
    ensure!(escrow.remaining() == Amount::ZERO);
    ensure!(escrow.record_refund() == Err(MarketError::NoFundsToRefund));
    Ok(())
}
