//! Caller identities.
//!
//! The host authenticates callers; the election only compares identities for
//! equality and uses them as map keys.

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Hash;

/// An opaque caller identity.
///
/// Identities minted by the ledger are the hex BLAKE3 hash of the caller's
/// Ed25519 public key. Any other text works when the election is embedded
/// directly.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the identity bound to a public key.
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        Self::from_key_bytes(key.as_bytes())
    }

    pub(crate) fn from_key_bytes(bytes: &[u8; 32]) -> Self {
        Self(Hash::of(bytes).to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
