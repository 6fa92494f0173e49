//! Service layer for agent profile initialization and lookup.

use crate::market::domain::{AgentId, AgentProfile, MarketResult, ProfileKey, ProfileName};
use crate::market::ports::MarketStore;
use mockable::Clock;
use std::sync::Arc;

/// Profile initialization and lookup service.
#[derive(Clone)]
pub struct ProfileService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ProfileService<S, C>
where
    S: MarketStore,
    C: Clock + Send + Sync,
{
    /// Creates a new profile service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Initializes `caller`'s profile with all counters at zero and returns
    /// its key.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the name is empty or over 50 characters and
    /// `DuplicateRecord` when the caller already holds a profile.
    pub fn initialize_profile(
        &self,
        caller: AgentId,
        name: impl Into<String>,
    ) -> MarketResult<ProfileKey> {
        let key = ProfileKey::derive(caller);
        let display = ProfileName::new(name)?;
        self.store.transact(|state| {
            let profile = AgentProfile::initialize(caller, display, &*self.clock);
            state.profiles_mut().create(key, profile)?;
            Ok(key)
        })
    }

    /// Retrieves `agent`'s profile.
    ///
    /// Returns `Ok(None)` when the agent has no profile.
    ///
    /// # Errors
    ///
    /// Returns `Store` when the store itself fails.
    pub fn find_profile(&self, agent: AgentId) -> MarketResult<Option<AgentProfile>> {
        let key = ProfileKey::derive(agent);
        self.store
            .read(|state| Ok(state.profiles().get(key).cloned()))
    }
}
