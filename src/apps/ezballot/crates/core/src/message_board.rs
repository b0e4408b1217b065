//! Append-only message board sharing the election's host.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Event, Identity};

/// A posted message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Identity,
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBoard {
    messages: Vec<Message>,
}

impl MessageBoard {
    /// Append a message, returning its position.
    pub fn post(
        &mut self,
        sender: &Identity,
        content: &str,
        events: &mut Vec<Event>,
    ) -> Result<u64, Error> {
        if content.trim().is_empty() {
            debug!("post from {} rejected: empty message", sender);
            return Err(Error::EmptyInput("message"));
        }

        let index = self.message_count();
        self.messages.push(Message {
            sender: sender.clone(),
            content: content.to_string(),
        });
        info!("message {} posted by {}", index, sender);
        events.push(Event::MessagePosted {
            sender: sender.clone(),
            content: content.to_string(),
        });

        Ok(index)
    }

    pub fn message_count(&self) -> u64 {
        self.messages.len() as u64
    }

    pub fn latest_message(&self) -> Result<&Message, Error> {
        self.messages.last().ok_or(Error::NotFound("messages"))
    }
}
