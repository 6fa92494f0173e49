//! Tests for posting, updating, cancelling, and disputing tasks.

use crate::market::domain::{
    AgentId, Amount, MarketError, TaskChanges, TaskKey, TaskStatus,
};
use crate::market::services::PostTaskRequest;
use crate::market::tests::support::{self, Market};
use chrono::TimeDelta;
use eyre::{bail, ensure};
use rstest::{fixture, rstest};

#[fixture]
fn market() -> Market {
    Market::new()
}

#[rstest]
fn post_task_creates_an_open_task(market: Market) -> eyre::Result<()> {
    let owner = AgentId::new();
    let key = market.tasks.post_task(
        owner,
        PostTaskRequest::new(1, support::draft_with_milestones(&[200, 500, 300])),
    )?;

    let Some(task) = market.tasks.find_task(key)? else {
        bail!("posted task not found");
    };
    ensure!(task.status() == TaskStatus::Open);
    ensure!(task.owner() == owner);
    ensure!(task.budget() == Amount::new(1000));
    ensure!(task.milestones().len() == 3);
    ensure!(task.accepted_bid().is_none());
    ensure!(task.escrow().is_none());
    Ok(())
}

#[rstest]
fn post_task_counts_toward_an_existing_profile(market: Market) -> eyre::Result<()> {
    let owner = AgentId::new();
    market.profiles.initialize_profile(owner, "Poster")?;

    market.tasks.post_task(
        owner,
        PostTaskRequest::new(1, support::draft_with_milestones(&[100])),
    )?;

    let Some(profile) = market.profiles.find_profile(owner)? else {
        bail!("profile not found");
    };
    ensure!(profile.tasks_posted() == 1);
    Ok(())
}

#[rstest]
fn post_task_rejects_a_reused_nonce(market: Market) -> eyre::Result<()> {
    let owner = AgentId::new();
    let request = PostTaskRequest::new(1, support::draft_with_milestones(&[100]));
    market.tasks.post_task(owner, request.clone())?;

    let result = market.tasks.post_task(owner, request);

    ensure!(matches!(result, Err(MarketError::DuplicateRecord(_))));
    Ok(())
}

#[rstest]
fn post_task_rejects_an_empty_title(market: Market) {
    let mut draft = support::draft_with_milestones(&[100]);
    draft.title = String::new();

    let result = market
        .tasks
        .post_task(AgentId::new(), PostTaskRequest::new(1, draft));

    assert!(matches!(
        result,
        Err(MarketError::Validation { field: "title", .. })
    ));
}

#[rstest]
#[case(999)]
#[case(1001)]
fn post_task_rejects_milestones_that_miss_the_budget(market: Market, #[case] budget: u64) {
    let mut draft = support::draft_with_milestones(&[200, 500, 300]);
    draft.budget = Amount::new(budget);

    let result = market
        .tasks
        .post_task(AgentId::new(), PostTaskRequest::new(1, draft));

    assert!(matches!(
        result,
        Err(MarketError::Validation {
            field: "milestones",
            ..
        })
    ));
}

#[rstest]
fn post_task_rejects_a_zero_priced_milestone(market: Market) {
    let result = market.tasks.post_task(
        AgentId::new(),
        PostTaskRequest::new(1, support::draft_with_milestones(&[100, 0])),
    );

    assert!(matches!(
        result,
        Err(MarketError::Validation {
            field: "milestones",
            ..
        })
    ));
}

#[rstest]
fn post_task_rejects_more_than_ten_milestones(market: Market) {
    let amounts = [10_u64; 11];

    let result = market.tasks.post_task(
        AgentId::new(),
        PostTaskRequest::new(1, support::draft_with_milestones(&amounts)),
    );

    assert!(matches!(
        result,
        Err(MarketError::Validation {
            field: "milestones",
            ..
        })
    ));
}

#[rstest]
fn post_task_rejects_a_deadline_in_the_past(market: Market) {
    let mut draft = support::draft_with_milestones(&[100]);
    draft.deadline = support::base_time() - TimeDelta::seconds(1);

    let result = market
        .tasks
        .post_task(AgentId::new(), PostTaskRequest::new(1, draft));

    assert!(matches!(
        result,
        Err(MarketError::Validation {
            field: "deadline",
            ..
        })
    ));
}

#[rstest]
fn update_task_applies_changes_while_open(market: Market) -> eyre::Result<()> {
    let owner = AgentId::new();
    let key = market.tasks.post_task(
        owner,
        PostTaskRequest::new(1, support::draft_with_milestones(&[100])),
    )?;

    market.tasks.update_task(
        owner,
        key,
        TaskChanges::new()
            .with_description("Amended scope")
            .with_deadline(support::deadline() + TimeDelta::days(10)),
    )?;

    let Some(task) = market.tasks.find_task(key)? else {
        bail!("task not found");
    };
    ensure!(task.description() == "Amended scope");
    ensure!(task.deadline() == support::deadline() + TimeDelta::days(10));
    Ok(())
}

#[rstest]
fn update_task_rejects_a_non_owner(market: Market) -> eyre::Result<()> {
    let owner = AgentId::new();
    let key = market.tasks.post_task(
        owner,
        PostTaskRequest::new(1, support::draft_with_milestones(&[100])),
    )?;

    let intruder = AgentId::new();
    let result = market
        .tasks
        .update_task(intruder, key, TaskChanges::new().with_description("mine"));

    ensure!(matches!(result, Err(MarketError::Unauthorized { caller, .. }) if caller == intruder));
    Ok(())
}

#[rstest]
fn update_task_rejects_a_task_no_longer_open(market: Market) -> eyre::Result<()> {
    let engagement = support::accepted_engagement(&market)?;

    let result = market.tasks.update_task(
        engagement.client,
        engagement.task,
        TaskChanges::new().with_budget(Amount::new(500)),
    );

    ensure!(
        result
            == Err(MarketError::InvalidState {
                entity: "task",
                status: "in_progress",
            })
    );
    Ok(())
}

#[rstest]
fn cancel_task_is_permitted_only_while_open(market: Market) -> eyre::Result<()> {
    let owner = AgentId::new();
    let key = market.tasks.post_task(
        owner,
        PostTaskRequest::new(1, support::draft_with_milestones(&[100])),
    )?;

    market.tasks.cancel_task(owner, key)?;
    let Some(task) = market.tasks.find_task(key)? else {
        bail!("task not found");
    };
    ensure!(task.status() == TaskStatus::Cancelled);

    let again = market.tasks.cancel_task(owner, key);
    ensure!(
        again
            == Err(MarketError::InvalidState {
                entity: "task",
                status: "cancelled",
            })
    );
    Ok(())
}

#[rstest]
fn dispute_task_accepts_either_party(market: Market) -> eyre::Result<()> {
    let engagement = support::accepted_engagement(&market)?;

    market
        .tasks
        .dispute_task(engagement.freelancer, engagement.task)?;

    let Some(task) = market.tasks.find_task(engagement.task)? else {
        bail!("task not found");
    };
    ensure!(task.status() == TaskStatus::Disputed);
    Ok(())
}

#[rstest]
fn dispute_task_rejects_a_stranger(market: Market) -> eyre::Result<()> {
    let engagement = support::accepted_engagement(&market)?;

    let stranger = AgentId::new();
    let result = market.tasks.dispute_task(stranger, engagement.task);

    ensure!(matches!(result, Err(MarketError::Unauthorized { caller, .. }) if caller == stranger));
    Ok(())
}

#[rstest]
fn dispute_task_rejects_an_unknown_key(market: Market) {
    let result = market
        .tasks
        .dispute_task(AgentId::new(), TaskKey::derive(AgentId::new(), 9));

    assert!(matches!(result, Err(MarketError::RecordNotFound(_))));
}
