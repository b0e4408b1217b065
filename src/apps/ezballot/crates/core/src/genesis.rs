//! Genesis configuration.
//!
//! The genesis state contains the minimum needed to bootstrap a ledger:
//! - The administrator, named by public key
//! - Optionally, an initial candidate slate registered by the administrator
//!
//! ```json
//! {
//!   "administrator": "<64 hex chars of an Ed25519 public key>",
//!   "candidates": ["Alice", "Bob"]
//! }
//! ```

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::hash::{decode_hex32, encode_hex};
use crate::{ElectionState, Error, Identity};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenesisConfig {
    /// Hex-encoded Ed25519 public key of the administrator.
    pub administrator: String,

    #[serde(default)]
    pub candidates: Vec<String>,
}

impl GenesisConfig {
    pub fn new(administrator: &VerifyingKey) -> Self {
        Self {
            administrator: encode_hex(administrator.as_bytes()),
            candidates: Vec::new(),
        }
    }

    pub fn with_candidates<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn administrator_key(&self) -> Result<VerifyingKey, Error> {
        let bytes = decode_hex32(&self.administrator).ok_or_else(|| {
            Error::Config("administrator must be 64 hex characters".to_string())
        })?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|e| Error::Config(format!("administrator key: {}", e)))
    }

    pub fn administrator_identity(&self) -> Result<Identity, Error> {
        Ok(Identity::from_public_key(&self.administrator_key()?))
    }

    /// Build the initial election state, registering the candidate slate.
    pub fn build(&self) -> Result<ElectionState, Error> {
        let administrator = self.administrator_identity()?;
        let mut state = ElectionState::new(administrator.clone());
        let mut events = Vec::new();

        for name in &self.candidates {
            state
                .add_candidate(name, &administrator, &mut events)
                .map_err(|e| Error::Config(format!("candidate {:?}: {}", name, e)))?;
        }

        Ok(state)
    }
}
