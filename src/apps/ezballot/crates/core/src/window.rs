//! The voting window.
//!
//! The window is opened exactly once. Whether it is open *now* is never
//! stored: it is recomputed from the caller-supplied time on every read, so
//! expiry needs no transition and no clock inside the engine.
//!
//! ```text
//! NotStarted --start_voting--> Active --(now >= end_time)--> Ended
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{AccessControl, Error, Identity, StateError};

/// Seconds since the Unix epoch, supplied by the host.
pub type Timestamp = u64;

const SECONDS_PER_MINUTE: u64 = 60;

/// Lifecycle phase derived from the window and a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    Active,
    Ended,
}

/// Result of a status query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingStatus {
    pub is_open_now: bool,
    pub end_time: Timestamp,
    pub now: Timestamp,
}

/// Persisted window state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingWindow {
    opened: bool,
    end_time: Timestamp,
}

impl VotingWindow {
    /// Whether voting was ever opened. Sticky once true.
    pub fn opened(&self) -> bool {
        self.opened
    }

    /// End of the window; zero until opened.
    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    pub fn phase(&self, now: Timestamp) -> Phase {
        match (self.opened, now < self.end_time) {
            (false, _) => Phase::NotStarted,
            (true, true) => Phase::Active,
            (true, false) => Phase::Ended,
        }
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        self.phase(now) == Phase::Active
    }

    pub fn status(&self, now: Timestamp) -> VotingStatus {
        VotingStatus {
            is_open_now: self.is_open(now),
            end_time: self.end_time,
            now,
        }
    }

    /// Open the window for `duration_minutes`, returning its end time.
    pub fn start(
        &mut self,
        duration_minutes: u64,
        caller: &Identity,
        access: &AccessControl,
        candidate_count: u64,
        now: Timestamp,
    ) -> Result<Timestamp, Error> {
        access.require_administrator(caller)?;

        if candidate_count == 0 {
            debug!("start_voting rejected: no candidates");
            return Err(StateError::NoCandidates.into());
        }
        if self.opened {
            debug!("start_voting rejected: already opened");
            return Err(StateError::AlreadyActive.into());
        }

        let end_time = duration_minutes
            .checked_mul(SECONDS_PER_MINUTE)
            .and_then(|secs| now.checked_add(secs))
            .ok_or(Error::Overflow("voting end time"))?;

        self.opened = true;
        self.end_time = end_time;
        info!("voting opened at {} until {}", now, end_time);

        Ok(end_time)
    }

    pub(crate) fn require_not_opened(&self) -> Result<(), Error> {
        if self.opened {
            return Err(StateError::CandidateAdditionClosed.into());
        }
        Ok(())
    }

    pub(crate) fn require_active(&self, now: Timestamp) -> Result<(), Error> {
        if !self.is_open(now) {
            return Err(StateError::VotingNotActive.into());
        }
        Ok(())
    }

    pub(crate) fn require_ended(&self, now: Timestamp) -> Result<(), Error> {
        if self.phase(now) != Phase::Ended {
            return Err(StateError::VotingOngoing.into());
        }
        Ok(())
    }
}
