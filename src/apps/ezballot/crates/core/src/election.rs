//! The election: candidate registry, voting window, ballot box and tally
//! behind one administrator.
//!
//! [`ElectionState`] is the persisted state and carries the operations. Each
//! operation validates all of its preconditions before its first write and
//! appends the notifications it produced to a caller-owned buffer.
//! [`Election`] wraps the state with a [`Notifier`] for embedders that want
//! observers instead of a buffer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::hash::to_cbor;
use crate::{
    AccessControl, BallotBox, CandidateId, CandidateInfo, CandidateRegistry, Error, Event, Hash,
    Identity, Notifier, Observer, Phase, Results, TallyEngine, Timestamp, VoterRecord,
    VotingStatus, VotingWindow, Winner,
};

/// Everything the election persists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionState {
    access: AccessControl,
    candidates: CandidateRegistry,
    ballots: BallotBox,
    window: VotingWindow,
}

impl ElectionState {
    pub fn new(administrator: Identity) -> Self {
        Self {
            access: AccessControl::new(administrator),
            candidates: CandidateRegistry::default(),
            ballots: BallotBox::default(),
            window: VotingWindow::default(),
        }
    }

    pub fn administrator(&self) -> &Identity {
        self.access.administrator()
    }

    pub fn candidates(&self) -> &CandidateRegistry {
        &self.candidates
    }

    pub fn ballots(&self) -> &BallotBox {
        &self.ballots
    }

    pub fn window(&self) -> &VotingWindow {
        &self.window
    }

    pub fn add_candidate(
        &mut self,
        name: &str,
        caller: &Identity,
        events: &mut Vec<Event>,
    ) -> Result<CandidateId, Error> {
        let id = self
            .candidates
            .add(name, caller, &self.access, &self.window)?;
        events.push(Event::CandidateAdded {
            name: name.trim().to_string(),
            id,
        });
        Ok(id)
    }

    pub fn start_voting(
        &mut self,
        duration_minutes: u64,
        caller: &Identity,
        now: Timestamp,
        events: &mut Vec<Event>,
    ) -> Result<Timestamp, Error> {
        let end_time = self.window.start(
            duration_minutes,
            caller,
            &self.access,
            self.candidates.count(),
            now,
        )?;
        events.push(Event::VotingStarted { end_time });
        Ok(end_time)
    }

    pub fn vote(
        &mut self,
        candidate_id: CandidateId,
        voter: &Identity,
        now: Timestamp,
        events: &mut Vec<Event>,
    ) -> Result<(), Error> {
        self.ballots
            .vote(candidate_id, voter, now, &self.window, &mut self.candidates)?;
        events.push(Event::VoteCast {
            voter: voter.clone(),
            candidate_id,
        });
        Ok(())
    }

    pub fn candidate_count(&self) -> u64 {
        self.candidates.count()
    }

    pub fn candidate(&self, id: CandidateId) -> CandidateInfo {
        self.candidates.info(id)
    }

    pub fn voter(&self, identity: &Identity) -> VoterRecord {
        self.ballots.voter(identity)
    }

    pub fn status(&self, now: Timestamp) -> VotingStatus {
        self.window.status(now)
    }

    pub fn phase(&self, now: Timestamp) -> Phase {
        self.window.phase(now)
    }

    pub fn winner(&self, now: Timestamp) -> Result<Winner, Error> {
        self.tally().winner(now)
    }

    pub fn all_results(&self, now: Timestamp) -> Result<Results, Error> {
        self.tally().all_results(now)
    }

    fn tally(&self) -> TallyEngine<'_> {
        TallyEngine::new(&self.candidates, &self.window)
    }

    /// Content hash of the CBOR encoding.
    pub fn hash(&self) -> Result<Hash, Error> {
        Hash::of_value(self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        to_cbor(self)
    }

    /// Decode a snapshot and reject it unless every invariant holds.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let state: Self = ciborium::from_reader(bytes)?;
        state.check_invariants()?;
        Ok(state)
    }

    /// Verify the invariants that can be checked from a single snapshot.
    pub fn check_invariants(&self) -> Result<(), Error> {
        for (position, candidate) in self.candidates.iter().enumerate() {
            if candidate.id != position as u64 {
                return Err(Error::Corrupt(format!(
                    "candidate at position {} has id {}",
                    position, candidate.id
                )));
            }
            if candidate.name.trim().is_empty() {
                return Err(Error::Corrupt(format!("candidate {} has no name", position)));
            }
        }

        if !self.window.opened() {
            if self.window.end_time() != 0 {
                return Err(Error::Corrupt("end time set on unopened window".into()));
            }
            if self.ballots.ballots_cast() != 0 {
                return Err(Error::Corrupt("ballots cast before voting opened".into()));
            }
        } else if self.candidates.is_empty() {
            return Err(Error::Corrupt("voting opened without candidates".into()));
        }

        let mut tallies: BTreeMap<CandidateId, u64> = BTreeMap::new();
        for (voter, candidate_id) in self.ballots.iter() {
            if !self.candidates.contains(candidate_id) {
                return Err(Error::Corrupt(format!(
                    "{} voted for unknown candidate {}",
                    voter, candidate_id
                )));
            }
            *tallies.entry(candidate_id).or_default() += 1;
        }
        for candidate in self.candidates.iter() {
            let expected = tallies.get(&candidate.id).copied().unwrap_or(0);
            if candidate.vote_count != expected {
                return Err(Error::Corrupt(format!(
                    "candidate {} counts {} votes but {} ballots name it",
                    candidate.id, candidate.vote_count, expected
                )));
            }
        }

        Ok(())
    }
}

/// An election that delivers notifications to observers.
#[derive(Debug)]
pub struct Election {
    state: ElectionState,
    notifier: Notifier,
}

impl Election {
    pub fn new(administrator: Identity) -> Self {
        Self::from_state(ElectionState::new(administrator))
    }

    pub fn from_state(state: ElectionState) -> Self {
        Self {
            state,
            notifier: Notifier::default(),
        }
    }

    pub fn state(&self) -> &ElectionState {
        &self.state
    }

    pub fn into_state(self) -> ElectionState {
        self.state
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) {
        self.notifier.subscribe(observer);
    }

    pub fn administrator(&self) -> &Identity {
        self.state.administrator()
    }

    pub fn add_candidate(&mut self, name: &str, caller: &Identity) -> Result<CandidateId, Error> {
        self.commit(|state, events| state.add_candidate(name, caller, events))
    }

    pub fn start_voting(
        &mut self,
        duration_minutes: u64,
        caller: &Identity,
        now: Timestamp,
    ) -> Result<Timestamp, Error> {
        self.commit(|state, events| state.start_voting(duration_minutes, caller, now, events))
    }

    pub fn vote(
        &mut self,
        candidate_id: CandidateId,
        voter: &Identity,
        now: Timestamp,
    ) -> Result<(), Error> {
        self.commit(|state, events| state.vote(candidate_id, voter, now, events))
    }

    pub fn candidate_count(&self) -> u64 {
        self.state.candidate_count()
    }

    pub fn candidate(&self, id: CandidateId) -> CandidateInfo {
        self.state.candidate(id)
    }

    pub fn voter(&self, identity: &Identity) -> VoterRecord {
        self.state.voter(identity)
    }

    pub fn status(&self, now: Timestamp) -> VotingStatus {
        self.state.status(now)
    }

    pub fn phase(&self, now: Timestamp) -> Phase {
        self.state.phase(now)
    }

    pub fn winner(&self, now: Timestamp) -> Result<Winner, Error> {
        self.state.winner(now)
    }

    pub fn all_results(&self, now: Timestamp) -> Result<Results, Error> {
        self.state.all_results(now)
    }

    fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut ElectionState, &mut Vec<Event>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut events = Vec::new();
        let out = op(&mut self.state, &mut events)?;
        for event in events {
            self.notifier.emit(event);
        }
        Ok(out)
    }
}
