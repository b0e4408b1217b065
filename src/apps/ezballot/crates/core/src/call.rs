//! Call messages: the mutations a transaction can carry.

use serde::{Deserialize, Serialize};

use crate::{CandidateId, Error, Event, Identity, LedgerState, Timestamp};

/// Call actions supported by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallMessage {
    AddCandidate { name: String },
    StartVoting { duration_minutes: u64 },
    Vote { candidate_id: CandidateId },
    PostMessage { text: String },
    RegisterName { name: String },
}

/// What a committed call returned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallResponse {
    CandidateAdded { id: CandidateId },
    VotingStarted { end_time: Timestamp },
    Voted,
    MessagePosted { index: u64 },
    NameRegistered,
}

impl LedgerState {
    pub(crate) fn dispatch(
        &mut self,
        msg: &CallMessage,
        sender: &Identity,
        now: Timestamp,
        events: &mut Vec<Event>,
    ) -> Result<CallResponse, Error> {
        match msg {
            CallMessage::AddCandidate { name } => {
                let id = self.election.add_candidate(name, sender, events)?;
                Ok(CallResponse::CandidateAdded { id })
            }
            CallMessage::StartVoting { duration_minutes } => {
                let end_time =
                    self.election
                        .start_voting(*duration_minutes, sender, now, events)?;
                Ok(CallResponse::VotingStarted { end_time })
            }
            CallMessage::Vote { candidate_id } => {
                self.election.vote(*candidate_id, sender, now, events)?;
                Ok(CallResponse::Voted)
            }
            CallMessage::PostMessage { text } => {
                let index = self.board.post(sender, text, events)?;
                Ok(CallResponse::MessagePosted { index })
            }
            CallMessage::RegisterName { name } => {
                self.names.register(sender, name, events)?;
                Ok(CallResponse::NameRegistered)
            }
        }
    }
}
