//! The ledger: a single-writer host that applies signed transactions in
//! order.
//!
//! A transaction is applied to a scratch copy of the state; the copy replaces
//! the live state only when the call succeeded and the new state hash was
//! computed. Observers are notified after that swap.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::hash::to_cbor;
use crate::{
    CallResponse, ElectionState, Error, GenesisConfig, Hash, Identity, MessageBoard, Notifier,
    Observer, QueryMessage, QueryResponse, Timestamp, Transaction, UsernameRegistry,
};

/// Everything the ledger persists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub(crate) election: ElectionState,
    pub(crate) board: MessageBoard,
    pub(crate) names: UsernameRegistry,
    nonces: BTreeMap<Identity, u64>,
    clock: Timestamp,
}

impl LedgerState {
    pub fn new(election: ElectionState) -> Self {
        Self {
            election,
            board: MessageBoard::default(),
            names: UsernameRegistry::default(),
            nonces: BTreeMap::new(),
            clock: 0,
        }
    }

    pub fn election(&self) -> &ElectionState {
        &self.election
    }

    pub fn board(&self) -> &MessageBoard {
        &self.board
    }

    pub fn names(&self) -> &UsernameRegistry {
        &self.names
    }

    /// Next nonce expected from `identity`.
    pub fn nonce(&self, identity: &Identity) -> u64 {
        self.nonces.get(identity).copied().unwrap_or(0)
    }

    /// Time of the last committed transaction.
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    pub fn hash(&self) -> Result<Hash, Error> {
        Hash::of_value(self)
    }
}

/// Record of a committed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: Hash,
    pub sender: Identity,
    pub nonce: u64,
    pub now: Timestamp,
    pub response: CallResponse,
    /// Hash of the ledger state after this transaction.
    pub state_hash: Hash,
}

pub struct Ledger {
    state: LedgerState,
    history: Vec<Receipt>,
    notifier: Notifier,
}

impl Ledger {
    pub fn new(state: LedgerState) -> Self {
        Self {
            state,
            history: Vec::new(),
            notifier: Notifier::default(),
        }
    }

    pub fn from_genesis(config: &GenesisConfig) -> Result<Self, Error> {
        let election = config.build()?;
        info!(
            "genesis: administrator {}, {} candidates",
            election.administrator(),
            election.candidate_count()
        );
        Ok(Self::new(LedgerState::new(election)))
    }

    /// Restore from a snapshot, rejecting it if the election is corrupt.
    /// History is not part of a snapshot.
    pub fn restore(bytes: &[u8]) -> Result<Self, Error> {
        let state: LedgerState = ciborium::from_reader(bytes)?;
        state.election.check_invariants()?;
        Ok(Self::new(state))
    }

    pub fn snapshot(&self) -> Result<Vec<u8>, Error> {
        to_cbor(&self.state)
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn history(&self) -> &[Receipt] {
        &self.history
    }

    pub fn state_hash(&self) -> Result<Hash, Error> {
        self.state.hash()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) {
        self.notifier.subscribe(observer);
    }

    /// Authenticate and apply one transaction at host time `now`.
    pub fn submit(&mut self, tx: &Transaction, now: Timestamp) -> Result<Receipt, Error> {
        let sender = tx.sender_identity();

        if let Err(e) = tx.verify() {
            warn!("rejected transaction with bad signature from {}", sender);
            return Err(e);
        }
        if now < self.state.clock {
            warn!("rejected transaction at {} before ledger clock {}", now, self.state.clock);
            return Err(Error::ClockRegression {
                last: self.state.clock,
                supplied: now,
            });
        }
        let expected = self.state.nonce(&sender);
        if tx.nonce != expected {
            debug!("rejected nonce {} from {}, expected {}", tx.nonce, sender, expected);
            return Err(Error::InvalidNonce {
                sender,
                expected,
                got: tx.nonce,
            });
        }
        let tx_id = tx.id()?;

        let mut scratch = self.state.clone();
        let mut events = Vec::new();
        let response = scratch.dispatch(&tx.call, &sender, now, &mut events)?;
        let next_nonce = expected.checked_add(1).ok_or(Error::Overflow("nonce"))?;
        scratch.nonces.insert(sender.clone(), next_nonce);
        scratch.clock = now;
        let state_hash = scratch.hash()?;

        self.state = scratch;
        let receipt = Receipt {
            tx_id,
            sender,
            nonce: tx.nonce,
            now,
            response,
            state_hash,
        };
        self.history.push(receipt.clone());
        info!(
            "applied transaction {} from {} at {}",
            receipt.tx_id, receipt.sender, now
        );

        for event in events {
            self.notifier.emit(event);
        }

        Ok(receipt)
    }

    pub fn query(&self, query: &QueryMessage, now: Timestamp) -> Result<QueryResponse, Error> {
        self.state.query(query, now)
    }
}
