//! Identity types and deterministic record keys for marketplace entities.
//!
//! Keys are derived from the stable inputs that make each record unique, so
//! "key already occupied" doubles as the duplicate check: one task per
//! (owner, nonce), one bid per (task, bidder), one escrow per task, one
//! profile per identity, one review per (task, reviewer).

use crate::store::RecordKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Authenticated identity of a marketplace participant.
///
/// Identities are issued by the external wallet/signing collaborator; the
/// core only compares them and folds them into key derivations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(Uuid);

impl AgentId {
    /// Creates a new random identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identity from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the identity as key-derivation seed bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the fungible settlement asset an escrow is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(Uuid);

impl AssetId {
    /// Creates a new random asset identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an asset identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! typed_key {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(RecordKey);

        impl From<$name> for RecordKey {
            fn from(key: $name) -> Self {
                key.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_key! {
    /// Key of a task record: owner identity plus a caller-chosen nonce.
    TaskKey
}

typed_key! {
    /// Key of a bid record: task key plus bidder identity.
    BidKey
}

typed_key! {
    /// Key of an escrow record: one escrow per task.
    EscrowKey
}

typed_key! {
    /// Key of an agent profile record: one profile per identity.
    ProfileKey
}

typed_key! {
    /// Key of a review record: task key plus reviewer identity.
    ReviewKey
}

impl TaskKey {
    /// Derives the key for a task posted by `owner` under `nonce`.
    ///
    /// The nonce is the owner's discriminator between their own tasks;
    /// reusing one reproduces the same key and the store rejects the
    /// duplicate creation.
    #[must_use]
    pub fn derive(owner: AgentId, nonce: u64) -> Self {
        Self(RecordKey::derive(
            "task",
            &[owner.as_bytes(), nonce.to_string().as_bytes()],
        ))
    }
}

impl BidKey {
    /// Derives the key for `bidder`'s bid on `task`.
    #[must_use]
    pub fn derive(task: TaskKey, bidder: AgentId) -> Self {
        Self(RecordKey::derive(
            "bid",
            &[task.0.as_bytes(), bidder.as_bytes()],
        ))
    }
}

impl EscrowKey {
    /// Derives the key for the escrow funding `task`.
    #[must_use]
    pub fn derive(task: TaskKey) -> Self {
        Self(RecordKey::derive("escrow", &[task.0.as_bytes()]))
    }
}

impl ProfileKey {
    /// Derives the key for `owner`'s profile.
    #[must_use]
    pub fn derive(owner: AgentId) -> Self {
        Self(RecordKey::derive("profile", &[owner.as_bytes()]))
    }
}

impl ReviewKey {
    /// Derives the key for `reviewer`'s review of `task`.
    #[must_use]
    pub fn derive(task: TaskKey, reviewer: AgentId) -> Self {
        Self(RecordKey::derive(
            "review",
            &[task.0.as_bytes(), reviewer.as_bytes()],
        ))
    }
}
