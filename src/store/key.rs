//! Deterministic record-key derivation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Storage address of a marketplace record.
///
/// A key is the SHA-256 digest of a domain tag followed by the record's
/// stable seed inputs, so two records derived from the same inputs always
/// collide and records derived from different inputs never do (up to hash
/// collision resistance). The tag keeps keys from different entity families
/// disjoint even when their seeds coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey([u8; 32]);

impl RecordKey {
    /// Derives a key from a domain tag and ordered seed inputs.
    #[must_use]
    pub fn derive(tag: &str, seeds: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tag.as_bytes());
        for seed in seeds {
            hasher.update(seed);
        }
        Self(hasher.finalize().into())
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for RecordKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
