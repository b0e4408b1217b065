//! Candidate registry.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{AccessControl, Error, Identity, VotingWindow};

/// Sequential candidate id, starting at zero.
pub type CandidateId = u64;

/// A registered candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
}

/// Answer to a candidate lookup. Out-of-range ids give `exists == false`
/// with zero-valued fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub name: String,
    pub vote_count: u64,
    pub exists: bool,
}

/// Ordered, append-only list of candidates.
///
/// A candidate's id is its position in the list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRegistry {
    candidates: Vec<Candidate>,
}

impl CandidateRegistry {
    /// Register a candidate while the window is still unopened.
    ///
    /// Once voting has opened every call fails with
    /// `CandidateAdditionClosed`, whoever the caller and whatever the name.
    pub fn add(
        &mut self,
        name: &str,
        caller: &Identity,
        access: &AccessControl,
        window: &VotingWindow,
    ) -> Result<CandidateId, Error> {
        window.require_not_opened()?;
        access.require_administrator(caller)?;

        let name = name.trim();
        if name.is_empty() {
            debug!("add_candidate rejected: empty name");
            return Err(Error::EmptyInput("candidate name"));
        }

        let id = self.count();
        self.candidates.push(Candidate {
            id,
            name: name.to_string(),
            vote_count: 0,
        });
        info!("candidate {} registered as {:?}", id, name);

        Ok(id)
    }

    pub fn count(&self) -> u64 {
        self.candidates.len() as u64
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        usize::try_from(id).ok().and_then(|i| self.candidates.get(i))
    }

    /// Lookup that never fails; check `exists`.
    pub fn info(&self, id: CandidateId) -> CandidateInfo {
        self.get(id)
            .map(|c| CandidateInfo {
                name: c.name.clone(),
                vote_count: c.vote_count,
                exists: true,
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, id: CandidateId) -> bool {
        self.get(id).is_some()
    }

    /// Candidates in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Count after one more vote for `id`, without writing it.
    pub(crate) fn next_vote_count(&self, id: CandidateId) -> Result<u64, Error> {
        self.get(id)
            .ok_or(Error::InvalidReference(id))?
            .vote_count
            .checked_add(1)
            .ok_or(Error::Overflow("vote count"))
    }

    /// Store a count computed by [`Self::next_vote_count`]. Infallible so the
    /// caller can commit a ballot without partial writes.
    pub(crate) fn set_vote_count(&mut self, id: CandidateId, vote_count: u64) {
        if let Some(candidate) = usize::try_from(id)
            .ok()
            .and_then(|i| self.candidates.get_mut(i))
        {
            candidate.vote_count = vote_count;
        }
    }
}
