//! Read-only queries against the ledger.

use serde::{Deserialize, Serialize};

use crate::{
    CandidateId, CandidateInfo, Error, Identity, LedgerState, Message, Results, Timestamp,
    VoterRecord, VotingStatus, Winner,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMessage {
    Administrator,
    CandidateCount,
    Candidate { id: CandidateId },
    Voter { identity: Identity },
    Status,
    Winner,
    AllResults,
    MessageCount,
    LatestMessage,
    Username { identity: Identity },
    Nonce { identity: Identity },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResponse {
    Administrator(Identity),
    CandidateCount(u64),
    Candidate(CandidateInfo),
    Voter(VoterRecord),
    Status(VotingStatus),
    Winner(Winner),
    AllResults(Results),
    MessageCount(u64),
    LatestMessage(Message),
    Username(String),
    Nonce(u64),
}

impl LedgerState {
    /// Answer `query` as of `now`. Never mutates.
    pub fn query(&self, query: &QueryMessage, now: Timestamp) -> Result<QueryResponse, Error> {
        let response = match query {
            QueryMessage::Administrator => {
                QueryResponse::Administrator(self.election.administrator().clone())
            }
            QueryMessage::CandidateCount => {
                QueryResponse::CandidateCount(self.election.candidate_count())
            }
            QueryMessage::Candidate { id } => QueryResponse::Candidate(self.election.candidate(*id)),
            QueryMessage::Voter { identity } => QueryResponse::Voter(self.election.voter(identity)),
            QueryMessage::Status => QueryResponse::Status(self.election.status(now)),
            QueryMessage::Winner => QueryResponse::Winner(self.election.winner(now)?),
            QueryMessage::AllResults => QueryResponse::AllResults(self.election.all_results(now)?),
            QueryMessage::MessageCount => QueryResponse::MessageCount(self.board.message_count()),
            QueryMessage::LatestMessage => {
                QueryResponse::LatestMessage(self.board.latest_message()?.clone())
            }
            QueryMessage::Username { identity } => {
                QueryResponse::Username(self.names.username(identity).to_string())
            }
            QueryMessage::Nonce { identity } => QueryResponse::Nonce(self.nonce(identity)),
        };
        Ok(response)
    }
}
