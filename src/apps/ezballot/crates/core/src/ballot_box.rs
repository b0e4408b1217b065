//! Per-voter ballot records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::{CandidateId, CandidateRegistry, Error, Identity, Timestamp, VotingWindow};

/// A voter's record. Absent voters read as the default `(false, 0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub has_voted: bool,
    pub voted_for: CandidateId,
}

/// Holds the one committed choice of every identity that voted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotBox {
    voters: BTreeMap<Identity, CandidateId>,
}

impl BallotBox {
    /// Cast `voter`'s single vote for `candidate_id`.
    pub fn vote(
        &mut self,
        candidate_id: CandidateId,
        voter: &Identity,
        now: Timestamp,
        window: &VotingWindow,
        registry: &mut CandidateRegistry,
    ) -> Result<(), Error> {
        window.require_active(now)?;

        if !registry.contains(candidate_id) {
            debug!("vote from {} rejected: unknown candidate {}", voter, candidate_id);
            return Err(Error::InvalidReference(candidate_id));
        }
        if self.voters.contains_key(voter) {
            debug!("vote from {} rejected: already voted", voter);
            return Err(Error::AlreadyVoted(voter.clone()));
        }
        let vote_count = registry.next_vote_count(candidate_id)?;

        self.voters.insert(voter.clone(), candidate_id);
        registry.set_vote_count(candidate_id, vote_count);
        info!("vote from {} recorded for candidate {}", voter, candidate_id);

        Ok(())
    }

    pub fn voter(&self, identity: &Identity) -> VoterRecord {
        self.voters
            .get(identity)
            .map(|&voted_for| VoterRecord {
                has_voted: true,
                voted_for,
            })
            .unwrap_or_default()
    }

    /// Number of identities that have voted.
    pub fn ballots_cast(&self) -> u64 {
        self.voters.len() as u64
    }

    /// Committed choices keyed by voter.
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, CandidateId)> {
        self.voters.iter().map(|(voter, &id)| (voter, id))
    }
}
