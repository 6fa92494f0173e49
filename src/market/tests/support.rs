//! Shared fixtures: a settable clock and a fully wired marketplace.

use crate::market::adapters::InMemoryMarketStore;
use crate::market::domain::{
    AgentId, Amount, AssetId, BidKey, BidTerms, MarketResult, MilestoneDraft, TaskDraft, TaskKey,
};
use crate::market::ports::MarketStore;
use crate::market::services::{
    BidService, EscrowService, PostTaskRequest, ProfileService, ReviewService, TaskService,
};
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex, PoisonError};

/// Test clock pinned to an explicit instant, advanced on demand.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The instant every test clock starts at.
pub fn base_time() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::days(20_454)
}

/// A deadline comfortably ahead of [`base_time`].
pub fn deadline() -> DateTime<Utc> {
    base_time() + TimeDelta::days(30)
}

/// Every service wired to one shared store and clock.
pub struct Market {
    pub store: Arc<InMemoryMarketStore>,
    pub clock: Arc<FixedClock>,
    pub tasks: TaskService<InMemoryMarketStore, FixedClock>,
    pub bids: BidService<InMemoryMarketStore, FixedClock>,
    pub escrows: EscrowService<InMemoryMarketStore, FixedClock>,
    pub profiles: ProfileService<InMemoryMarketStore, FixedClock>,
    pub reviews: ReviewService<InMemoryMarketStore, FixedClock>,
}

impl Market {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryMarketStore::new(AssetId::new()));
        let clock = Arc::new(FixedClock::at(base_time()));
        Self {
            tasks: TaskService::new(Arc::clone(&store), Arc::clone(&clock)),
            bids: BidService::new(Arc::clone(&store), Arc::clone(&clock)),
            escrows: EscrowService::new(Arc::clone(&store), Arc::clone(&clock)),
            profiles: ProfileService::new(Arc::clone(&store), Arc::clone(&clock)),
            reviews: ReviewService::new(Arc::clone(&store), Arc::clone(&clock)),
            store,
            clock,
        }
    }

    pub fn credit(&self, account: AgentId, amount: u64) -> MarketResult<()> {
        self.store.credit_account(account, Amount::new(amount))
    }

    pub fn total_supply(&self) -> MarketResult<Amount> {
        self.store.read(|state| state.ledger().total_supply())
    }
}

/// Draft with one milestone per entry of `amounts`; the budget is their sum.
pub fn draft_with_milestones(amounts: &[u64]) -> TaskDraft {
    let milestones: Vec<MilestoneDraft> = amounts
        .iter()
        .enumerate()
        .map(|(index, &amount)| {
            MilestoneDraft::new(format!("milestone {index}"), Amount::new(amount))
        })
        .collect();
    TaskDraft {
        title: "Build the thing".to_owned(),
        description: "A task exercised by the test suite".to_owned(),
        budget: Amount::new(amounts.iter().sum()),
        milestones,
        deadline: deadline(),
    }
}

/// Bid terms for `amount` delivered within `days`.
pub fn terms(amount: u64, days: i64) -> BidTerms {
    BidTerms::new(
        Amount::new(amount),
        TimeDelta::days(days),
        "I will build the thing",
    )
}

/// A task mid-flight: posted with milestones [200, 500, 300], won by a
/// 900-unit bid, now `InProgress`.
pub struct Engagement {
    pub client: AgentId,
    pub freelancer: AgentId,
    pub task: TaskKey,
    pub bid: BidKey,
}

pub fn accepted_engagement(market: &Market) -> MarketResult<Engagement> {
    let client = AgentId::new();
    let freelancer = AgentId::new();
    let task = market.tasks.post_task(
        client,
        PostTaskRequest::new(1, draft_with_milestones(&[200, 500, 300])),
    )?;
    let bid = market.bids.submit_bid(freelancer, task, terms(900, 10))?;
    market.bids.accept_bid(client, bid)?;
    Ok(Engagement {
        client,
        freelancer,
        task,
        bid,
    })
}
