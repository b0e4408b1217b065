//! Error types for ezballot-core.

use thiserror::Error;

use crate::{CandidateId, Identity, Timestamp};

/// Core errors.
///
/// Every error is a deterministic function of the state and the inputs of the
/// failed operation. An operation that returns an error has made no writes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Caller is not the administrator.
    #[error("caller {0} is not the administrator")]
    Unauthorized(Identity),

    /// A required text input was blank.
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),

    /// Operation attempted in the wrong lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(#[from] StateError),

    /// Candidate id does not name a registered candidate.
    #[error("candidate {0} does not exist")]
    InvalidReference(CandidateId),

    /// Identity already has a vote on record.
    #[error("{0} has already voted")]
    AlreadyVoted(Identity),

    /// Identity already bound a name.
    #[error("{0} is already registered")]
    AlreadyRegistered(Identity),

    /// Query against an empty collection.
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// Checked arithmetic overflowed.
    #[error("overflow computing {0}")]
    Overflow(&'static str),

    /// Transaction signature does not verify against its sender key.
    #[error("invalid signature for sender {0}")]
    InvalidSignature(Identity),

    /// Transaction nonce is not the next one expected for the sender.
    #[error("invalid nonce for {sender}: expected {expected}, got {got}")]
    InvalidNonce {
        sender: Identity,
        expected: u64,
        got: u64,
    },

    /// Host supplied a time earlier than the last committed one.
    #[error("clock moved backwards: last {last}, supplied {supplied}")]
    ClockRegression { last: Timestamp, supplied: Timestamp },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Decoded state violates an invariant.
    #[error("corrupt state: {0}")]
    Corrupt(String),

    /// Genesis configuration is invalid.
    #[error("invalid config: {0}")]
    Config(String),
}

/// Lifecycle sub-kinds of [`Error::InvalidState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("voting is already active")]
    AlreadyActive,

    #[error("no candidates added")]
    NoCandidates,

    #[error("voting is not active")]
    VotingNotActive,

    #[error("voting has not ended yet")]
    VotingOngoing,

    #[error("cannot add candidates after voting starts")]
    CandidateAdditionClosed,
}

impl From<ciborium::ser::Error<std::io::Error>> for Error {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<ciborium::de::Error<std::io::Error>> for Error {
    fn from(e: ciborium::de::Error<std::io::Error>) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
