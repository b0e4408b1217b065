//! Notifications emitted after committed operations.
//!
//! Events are a side channel: observers see them only after the operation's
//! writes are in place, and nothing an observer does can change state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::{CandidateId, Identity, Timestamp};

/// A committed state change, as seen by external subscribers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    CandidateAdded { name: String, id: CandidateId },
    VotingStarted { end_time: Timestamp },
    VoteCast { voter: Identity, candidate_id: CandidateId },
    MessagePosted { sender: Identity, content: String },
    Registered { identity: Identity, name: String },
}

/// Receives events.
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Event);
}

/// Fan-out to registered observers.
#[derive(Clone, Default)]
pub struct Notifier {
    observers: Vec<Arc<dyn Observer>>,
}

impl Notifier {
    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn emit(&self, event: Event) {
        for observer in &self.observers {
            observer.notify(&event);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Observer that keeps every event it sees, in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Copy of the events seen so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Take the events seen so far, leaving the log empty.
    pub fn drain(&self) -> Vec<Event> {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *events)
    }
}

impl Observer for EventLog {
    fn notify(&self, event: &Event) {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        events.push(event.clone());
    }
}
