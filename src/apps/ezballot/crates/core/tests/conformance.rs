//! Conformance tests for the ezballot election host.
//!
//! These tests drive the public API only: the election state machine
//! directly, and the ledger through signed transactions.

use std::collections::BTreeSet;

use ed25519_dalek::SigningKey;
use ezballot_core::{
    CallMessage, CandidateInfo, Election, ElectionState, Error, Event, EventLog, GenesisConfig,
    Identity, Ledger, Message, Phase, QueryMessage, QueryResponse, StateError, Transaction,
    VoterRecord, VotingStatus,
};
use proptest::prelude::*;
use rand::rngs::OsRng;

// =============================================================================
// Test Utilities
// =============================================================================

const ONGOING: Error = Error::InvalidState(StateError::VotingOngoing);

fn admin() -> Identity {
    Identity::new("admin")
}

fn voter(n: impl std::fmt::Display) -> Identity {
    Identity::new(format!("voter-{n}"))
}

/// An election with the given candidates, not yet opened.
fn election_with(names: &[&str]) -> Election {
    let mut election = Election::new(admin());
    for name in names {
        election.add_candidate(name, &admin()).unwrap();
    }
    election
}

/// Registers one candidate per entry, opens a one-minute window at t=0 and
/// casts `counts[i]` votes for candidate `i` from distinct voters.
fn finished_election(counts: &[u64]) -> Election {
    let names: Vec<String> = (0..counts.len()).map(|i| format!("c{i}")).collect();
    let mut election = Election::new(admin());
    for name in &names {
        election.add_candidate(name, &admin()).unwrap();
    }
    election.start_voting(1, &admin(), 0).unwrap();
    for (id, &n) in counts.iter().enumerate() {
        for v in 0..n {
            election.vote(id as u64, &voter(format!("{id}-{v}")), 1).unwrap();
        }
    }
    election
}

fn ledger_with(candidates: &[&str]) -> (Ledger, SigningKey) {
    let admin = SigningKey::generate(&mut OsRng);
    let config = GenesisConfig::new(&admin.verifying_key()).with_candidates(candidates.iter().copied());
    (Ledger::from_genesis(&config).unwrap(), admin)
}

fn signed(key: &SigningKey, nonce: u64, call: CallMessage) -> Transaction {
    Transaction::new(call, nonce, key).unwrap()
}

// =============================================================================
// Candidate Registry
// =============================================================================

/// Property: a fresh election has no candidates and has not started.
#[test]
fn fresh_election_is_empty() {
    let election = Election::new(admin());

    assert_eq!(election.administrator(), &admin());
    assert_eq!(election.candidate_count(), 0);
    assert_eq!(
        election.status(1_000),
        VotingStatus { is_open_now: false, end_time: 0, now: 1_000 }
    );
}

/// Property: the administrator's candidates are readable with zero votes.
#[test]
fn added_candidate_is_readable() {
    let log = EventLog::new();
    let mut election = Election::new(admin());
    election.subscribe(log.clone());

    assert_eq!(election.add_candidate("Candidate 1", &admin()), Ok(0));
    assert_eq!(
        election.candidate(0),
        CandidateInfo { name: "Candidate 1".into(), vote_count: 0, exists: true }
    );
    assert_eq!(
        log.events(),
        vec![Event::CandidateAdded { name: "Candidate 1".into(), id: 0 }]
    );
}

/// Property: only the administrator adds candidates, and names are required.
#[test]
fn add_candidate_preconditions() {
    let mut election = Election::new(admin());

    assert_eq!(
        election.add_candidate("Candidate 1", &voter(1)),
        Err(Error::Unauthorized(voter(1)))
    );
    assert_eq!(
        election.add_candidate("", &admin()),
        Err(Error::EmptyInput("candidate name"))
    );
    // Caller is checked before the name.
    assert_eq!(
        election.add_candidate("", &voter(1)),
        Err(Error::Unauthorized(voter(1)))
    );
    assert_eq!(election.candidate_count(), 0);
}

proptest! {
    /// Property: ids handed out before voting are 0, 1, 2, ... in call order.
    #[test]
    fn candidate_ids_are_sequential(names in prop::collection::vec("[a-zA-Z][a-zA-Z ]{0,11}", 1..20)) {
        let mut election = Election::new(admin());
        for (expected, name) in names.iter().enumerate() {
            prop_assert_eq!(election.add_candidate(name, &admin()), Ok(expected as u64));
        }
        prop_assert_eq!(election.candidate_count(), names.len() as u64);
        for (id, name) in names.iter().enumerate() {
            prop_assert_eq!(election.candidate(id as u64).name, name.trim());
        }
    }

    /// Property: once voting has started no caller can add any candidate.
    #[test]
    fn no_candidates_after_start(name in "[a-zA-Z ]{0,8}", caller_is_admin in any::<bool>()) {
        let mut election = election_with(&["A"]);
        election.start_voting(1, &admin(), 0).unwrap();
        let caller = if caller_is_admin { admin() } else { voter(0) };

        prop_assert_eq!(
            election.add_candidate(&name, &caller),
            Err(Error::InvalidState(StateError::CandidateAdditionClosed))
        );
        prop_assert_eq!(election.candidate_count(), 1);
    }
}

// =============================================================================
// Voting Window
// =============================================================================

/// Property: the window opens once, for the requested number of minutes.
#[test]
fn start_voting_opens_window() {
    let log = EventLog::new();
    let mut election = election_with(&["Candidate 1", "Candidate 2"]);
    election.subscribe(log.clone());

    let end_time = election.start_voting(60, &admin(), 1_000).unwrap();
    assert_eq!(end_time, 1_000 + 3_600);

    let status = election.status(1_001);
    assert!(status.is_open_now);
    assert!(status.end_time > status.now);
    assert_eq!(log.events(), vec![Event::VotingStarted { end_time }]);
}

/// Property: start_voting checks caller, then candidates, then whether opened.
#[test]
fn start_voting_preconditions() {
    let mut empty = Election::new(admin());
    assert_eq!(
        empty.start_voting(60, &voter(1), 0),
        Err(Error::Unauthorized(voter(1)))
    );
    assert_eq!(
        empty.start_voting(60, &admin(), 0),
        Err(Error::InvalidState(StateError::NoCandidates))
    );

    let mut election = election_with(&["A", "B"]);
    election.start_voting(60, &admin(), 0).unwrap();
    assert_eq!(
        election.start_voting(60, &admin(), 10),
        Err(Error::InvalidState(StateError::AlreadyActive))
    );
}

/// Property: expiry is a read-time predicate; the window never reopens.
#[test]
fn expiry_is_derived_from_supplied_time() {
    let mut election = election_with(&["A"]);
    election.start_voting(1, &admin(), 0).unwrap();

    assert_eq!(election.phase(59), Phase::Active);
    assert_eq!(election.phase(60), Phase::Ended);
    assert_eq!(election.phase(u64::MAX), Phase::Ended);
    assert_eq!(
        election.start_voting(1, &admin(), 120),
        Err(Error::InvalidState(StateError::AlreadyActive))
    );
    assert!(election.state().window().opened());
}

// =============================================================================
// Ballot Box
// =============================================================================

/// Property: a vote is recorded against the voter and counted once.
#[test]
fn vote_is_recorded() {
    let log = EventLog::new();
    let mut election = election_with(&["Candidate 1", "Candidate 2"]);
    election.start_voting(60, &admin(), 0).unwrap();
    election.subscribe(log.clone());

    election.vote(0, &voter(1), 10).unwrap();

    assert_eq!(
        election.voter(&voter(1)),
        VoterRecord { has_voted: true, voted_for: 0 }
    );
    assert_eq!(election.candidate(0).vote_count, 1);
    assert_eq!(
        log.events(),
        vec![Event::VoteCast { voter: voter(1), candidate_id: 0 }]
    );
}

/// Property: a voter who has not voted reads as (false, 0).
#[test]
fn unvoted_voter_reads_default() {
    let election = election_with(&["A"]);
    assert_eq!(
        election.voter(&voter(9)),
        VoterRecord { has_voted: false, voted_for: 0 }
    );
}

/// Property: several voters split across candidates are tallied separately.
#[test]
fn multiple_voters() {
    let mut election = election_with(&["Candidate 1", "Candidate 2"]);
    election.start_voting(60, &admin(), 0).unwrap();

    election.vote(0, &voter(1), 1).unwrap();
    election.vote(1, &voter(2), 2).unwrap();
    election.vote(0, &voter(3), 3).unwrap();

    assert_eq!(election.candidate(0).vote_count, 2);
    assert_eq!(election.candidate(1).vote_count, 1);
}

/// Property: voting for an unknown candidate fails with InvalidReference.
#[test]
fn vote_for_missing_candidate() {
    let mut election = election_with(&["A", "B"]);
    election.start_voting(60, &admin(), 0).unwrap();

    assert_eq!(
        election.vote(5, &voter("c"), 10),
        Err(Error::InvalidReference(5))
    );
    assert!(!election.voter(&voter("c")).has_voted);
}

/// Property: votes after the window has ended are rejected.
#[test]
fn vote_after_end() {
    let mut election = election_with(&["A", "B", "C"]);
    election.start_voting(1, &admin(), 0).unwrap();

    assert_eq!(
        election.vote(0, &voter(1), 61),
        Err(Error::InvalidState(StateError::VotingNotActive))
    );
}

proptest! {
    /// Property: at most one vote per identity succeeds, and after the
    /// window ends the counts sum to the number of distinct voters.
    #[test]
    fn one_vote_per_identity(votes in prop::collection::vec((0u8..8, 0u64..5), 0..40)) {
        let mut election = election_with(&["A", "B", "C"]);
        election.start_voting(10, &admin(), 0).unwrap();

        let mut succeeded = BTreeSet::new();
        for (t, (who, candidate)) in votes.iter().enumerate() {
            let result = election.vote(*candidate, &voter(who), t as u64);
            if succeeded.contains(who) {
                if *candidate < 3 {
                    prop_assert_eq!(result, Err(Error::AlreadyVoted(voter(who))));
                } else {
                    prop_assert_eq!(result, Err(Error::InvalidReference(*candidate)));
                }
            } else if *candidate < 3 {
                prop_assert_eq!(result, Ok(()));
                succeeded.insert(*who);
            } else {
                prop_assert_eq!(result, Err(Error::InvalidReference(*candidate)));
            }
        }

        let results = election.all_results(600).unwrap();
        prop_assert_eq!(results.vote_counts.iter().sum::<u64>(), succeeded.len() as u64);
        prop_assert!(election.state().check_invariants().is_ok());
    }
}

// =============================================================================
// Tally
// =============================================================================

/// Property: results are gated until the window has ended.
#[test]
fn results_gated_until_end() {
    let mut election = election_with(&["A", "B", "C"]);

    assert_eq!(election.winner(0).unwrap_err(), ONGOING);
    assert_eq!(election.all_results(0).unwrap_err(), ONGOING);

    election.start_voting(1, &admin(), 0).unwrap();
    assert_eq!(election.winner(59).unwrap_err(), ONGOING);
    assert_eq!(election.all_results(59).unwrap_err(), ONGOING);

    assert!(election.winner(61).is_ok());
    assert!(election.all_results(61).is_ok());
}

/// Scenario: a one-one tie between "X" and "Y" goes to X.
#[test]
fn tie_goes_to_first_candidate() {
    let mut election = election_with(&["X", "Y"]);
    election.start_voting(1, &admin(), 0).unwrap();
    election.vote(0, &voter("a"), 1).unwrap();
    election.vote(1, &voter("b"), 2).unwrap();

    let winner = election.winner(61).unwrap();
    assert_eq!(winner.id, 0);
    assert_eq!(winner.name, "X");
    assert_eq!(winner.votes, 1);
}

/// Scenario: with no votes cast the only candidate wins with zero.
#[test]
fn winner_without_votes() {
    let mut election = election_with(&["Solo"]);
    election.start_voting(1, &admin(), 0).unwrap();

    let winner = election.winner(61).unwrap();
    assert_eq!((winner.id, winner.votes), (0, 0));
}

/// Scenario: votes 2/1/0 come back in id order.
#[test]
fn all_results_in_id_order() {
    let election = finished_election(&[2, 1, 0]);
    let results = election.all_results(61).unwrap();

    assert_eq!(results.names, vec!["c0", "c1", "c2"]);
    assert_eq!(results.vote_counts, vec![2, 1, 0]);

    let winner = election.winner(61).unwrap();
    assert_eq!((winner.id, winner.name.as_str(), winner.votes), (0, "c0", 2));
}

proptest! {
    /// Property: the winner is the lowest id among the candidates with the
    /// highest count.
    #[test]
    fn winner_is_lowest_id_maximum(counts in prop::collection::vec(0u64..4, 1..6)) {
        let election = finished_election(&counts);
        let best = *counts.iter().max().unwrap();
        let expected = counts.iter().position(|&c| c == best).unwrap() as u64;

        let winner = election.winner(61).unwrap();
        prop_assert_eq!(winner.id, expected);
        prop_assert_eq!(winner.votes, best);
    }
}

// =============================================================================
// Snapshots
// =============================================================================

/// Property: an election survives a snapshot round trip with the same hash.
#[test]
fn snapshot_preserves_hash() {
    let election = finished_election(&[3, 1]);
    let bytes = election.state().to_bytes().unwrap();
    let restored = Election::from_state(ElectionState::from_bytes(&bytes).unwrap());

    assert_eq!(restored.state().hash().unwrap(), election.state().hash().unwrap());
    assert_eq!(restored.winner(61), election.winner(61));
}

// =============================================================================
// Ledger
// =============================================================================

/// Property: the full election runs end to end through signed transactions.
#[test]
fn ledger_runs_an_election() {
    let (mut ledger, admin_key) = ledger_with(&["X", "Y"]);
    let log = EventLog::new();
    ledger.subscribe(log.clone());

    ledger
        .submit(&signed(&admin_key, 0, CallMessage::StartVoting { duration_minutes: 1 }), 0)
        .unwrap();

    let a = SigningKey::generate(&mut OsRng);
    let b = SigningKey::generate(&mut OsRng);
    ledger.submit(&signed(&a, 0, CallMessage::Vote { candidate_id: 0 }), 10).unwrap();
    ledger.submit(&signed(&b, 0, CallMessage::Vote { candidate_id: 1 }), 20).unwrap();

    let a_id = Identity::from_public_key(&a.verifying_key());
    assert_eq!(
        ledger.query(&QueryMessage::Voter { identity: a_id.clone() }, 20),
        Ok(QueryResponse::Voter(VoterRecord { has_voted: true, voted_for: 0 }))
    );
    assert_eq!(
        ledger.query(&QueryMessage::Winner, 30),
        Err(Error::InvalidState(StateError::VotingOngoing))
    );

    match ledger.query(&QueryMessage::Winner, 61) {
        Ok(QueryResponse::Winner(winner)) => {
            assert_eq!((winner.id, winner.votes), (0, 1));
        }
        other => panic!("unexpected response: {other:?}"),
    }

    assert_eq!(ledger.history().len(), 3);
    assert_eq!(log.events().len(), 3);
    assert_eq!(
        log.events()[1],
        Event::VoteCast { voter: a_id, candidate_id: 0 }
    );
}

/// Property: replaying the same transactions reproduces every state hash.
#[test]
fn ledger_replay_is_deterministic() {
    let admin_key = SigningKey::generate(&mut OsRng);
    let voters: Vec<SigningKey> = (0..4).map(|_| SigningKey::generate(&mut OsRng)).collect();
    let config =
        GenesisConfig::new(&admin_key.verifying_key()).with_candidates(["A", "B", "C"]);

    let mut txs = vec![(signed(&admin_key, 0, CallMessage::StartVoting { duration_minutes: 5 }), 100)];
    for (i, key) in voters.iter().enumerate() {
        let call = CallMessage::Vote { candidate_id: (i % 3) as u64 };
        txs.push((signed(key, 0, call), 100 + i as u64));
    }
    txs.push((signed(&voters[0], 1, CallMessage::PostMessage { text: "done".into() }), 200));

    let run = || {
        let mut ledger = Ledger::from_genesis(&config).unwrap();
        for (tx, now) in &txs {
            ledger.submit(tx, *now).unwrap();
        }
        ledger
    };
    let first = run();
    let second = run();

    assert_eq!(first.history(), second.history());
    assert_eq!(first.state_hash().unwrap(), second.state_hash().unwrap());
}

/// Property: a forged transaction is rejected before anything changes.
#[test]
fn ledger_rejects_forgery() {
    let (mut ledger, admin_key) = ledger_with(&["A"]);
    let before = ledger.state_hash().unwrap();

    let mallory = SigningKey::generate(&mut OsRng);
    let mut tx = signed(&mallory, 0, CallMessage::StartVoting { duration_minutes: 1 });
    tx.sender = admin_key.verifying_key().to_bytes();

    assert!(matches!(ledger.submit(&tx, 0), Err(Error::InvalidSignature(_))));
    assert_eq!(ledger.state_hash().unwrap(), before);
    assert!(!ledger.state().election().window().opened());
}

/// Property: the collaborators work through the same ledger.
#[test]
fn ledger_hosts_collaborators() {
    let (mut ledger, _) = ledger_with(&[]);
    let alice = SigningKey::generate(&mut OsRng);
    let bob = SigningKey::generate(&mut OsRng);
    let alice_id = Identity::from_public_key(&alice.verifying_key());
    let bob_id = Identity::from_public_key(&bob.verifying_key());

    assert_eq!(
        ledger.query(&QueryMessage::LatestMessage, 0),
        Err(Error::NotFound("messages"))
    );

    ledger.submit(&signed(&alice, 0, CallMessage::PostMessage { text: "first".into() }), 1).unwrap();
    ledger.submit(&signed(&bob, 0, CallMessage::PostMessage { text: "second".into() }), 2).unwrap();
    assert_eq!(
        ledger.submit(&signed(&bob, 1, CallMessage::PostMessage { text: "".into() }), 3),
        Err(Error::EmptyInput("message"))
    );

    assert_eq!(
        ledger.query(&QueryMessage::MessageCount, 3),
        Ok(QueryResponse::MessageCount(2))
    );
    assert_eq!(
        ledger.query(&QueryMessage::LatestMessage, 3),
        Ok(QueryResponse::LatestMessage(Message {
            sender: bob_id.clone(),
            content: "second".into()
        }))
    );

    ledger.submit(&signed(&alice, 1, CallMessage::RegisterName { name: "alice".into() }), 4).unwrap();
    assert_eq!(
        ledger.submit(&signed(&alice, 2, CallMessage::RegisterName { name: "bob".into() }), 5),
        Err(Error::AlreadyRegistered(alice_id.clone()))
    );
    assert_eq!(
        ledger.query(&QueryMessage::Username { identity: alice_id }, 5),
        Ok(QueryResponse::Username("alice".into()))
    );
    assert_eq!(
        ledger.query(&QueryMessage::Username { identity: bob_id }, 5),
        Ok(QueryResponse::Username(String::new()))
    );
}
