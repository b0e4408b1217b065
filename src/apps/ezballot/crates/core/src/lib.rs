//! ezballot-core: Core types and state machine for the ezballot election host.
//!
//! An administrator registers candidates and opens a time-boxed voting
//! window; every identity votes at most once; once the window has closed
//! anyone can read the tally and the winner.
//!
//! - [`Election`] / [`ElectionState`]: the voting state machine
//! - [`Ledger`]: applies signed [`Transaction`]s one at a time
//! - [`MessageBoard`], [`UsernameRegistry`]: collaborators on the same host
//!
//! The engine never reads a clock. Every time-dependent operation takes the
//! host's `now`, so replaying the same inputs reproduces the same state.

mod access;
mod ballot_box;
mod call;
mod candidates;
mod election;
mod error;
mod event;
pub mod genesis;
mod hash;
mod identity;
mod ledger;
mod message_board;
mod query;
mod tally;
mod transaction;
mod username_registry;
mod window;

pub use access::AccessControl;
pub use ballot_box::{BallotBox, VoterRecord};
pub use call::{CallMessage, CallResponse};
pub use candidates::{Candidate, CandidateId, CandidateInfo, CandidateRegistry};
pub use election::{Election, ElectionState};
pub use error::{Error, StateError};
pub use event::{Event, EventLog, Notifier, Observer};
pub use genesis::GenesisConfig;
pub use hash::Hash;
pub use identity::Identity;
pub use ledger::{Ledger, LedgerState, Receipt};
pub use message_board::{Message, MessageBoard};
pub use query::{QueryMessage, QueryResponse};
pub use tally::{Results, TallyEngine, Winner};
pub use transaction::Transaction;
pub use username_registry::UsernameRegistry;
pub use window::{Phase, Timestamp, VotingStatus, VotingWindow};

/// Re-export for convenience
pub use ed25519_dalek::{SigningKey, VerifyingKey};
