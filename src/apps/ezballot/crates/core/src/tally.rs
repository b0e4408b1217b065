//! Tally and winner resolution.
//!
//! Both queries are gated on the window having ended. The winner is the
//! first candidate, scanning ids upwards, whose count is not exceeded by any
//! other; a later candidate replaces the leader only with a strictly greater
//! count, so ties (including the all-zero tie) go to the lowest id.

use serde::{Deserialize, Serialize};

use crate::{Candidate, CandidateId, CandidateRegistry, Error, Timestamp, VotingWindow};

/// Names and counts in ascending id order, element-wise aligned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    pub names: Vec<String>,
    pub vote_counts: Vec<u64>,
}

/// The resolved winner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub id: CandidateId,
    pub name: String,
    pub votes: u64,
}

/// Read-only view over a finished election.
pub struct TallyEngine<'a> {
    registry: &'a CandidateRegistry,
    window: &'a VotingWindow,
}

impl<'a> TallyEngine<'a> {
    pub fn new(registry: &'a CandidateRegistry, window: &'a VotingWindow) -> Self {
        Self { registry, window }
    }

    pub fn all_results(&self, now: Timestamp) -> Result<Results, Error> {
        self.window.require_ended(now)?;

        let (names, vote_counts) = self
            .registry
            .iter()
            .map(|c| (c.name.clone(), c.vote_count))
            .unzip();

        Ok(Results { names, vote_counts })
    }

    pub fn winner(&self, now: Timestamp) -> Result<Winner, Error> {
        self.window.require_ended(now)?;

        let best = first_maximum(self.registry.iter()).ok_or(Error::NotFound("candidates"))?;

        Ok(Winner {
            id: best.id,
            name: best.name.clone(),
            votes: best.vote_count,
        })
    }
}

/// Left-to-right fold keeping the first candidate with the highest count.
fn first_maximum<'c>(mut candidates: impl Iterator<Item = &'c Candidate>) -> Option<&'c Candidate> {
    let first = candidates.next()?;
    Some(candidates.fold(first, |best, candidate| {
        if candidate.vote_count > best.vote_count {
            candidate
        } else {
            best
        }
    }))
}
