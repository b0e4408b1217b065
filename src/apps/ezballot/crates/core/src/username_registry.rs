//! One-shot identity to name bindings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::{Error, Event, Identity};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameRegistry {
    names: BTreeMap<Identity, String>,
}

impl UsernameRegistry {
    /// Bind `name` to `caller`. Each identity registers at most once.
    pub fn register(
        &mut self,
        caller: &Identity,
        name: &str,
        events: &mut Vec<Event>,
    ) -> Result<(), Error> {
        if name.trim().is_empty() {
            return Err(Error::EmptyInput("username"));
        }
        if self.names.contains_key(caller) {
            debug!("register from {} rejected: already registered", caller);
            return Err(Error::AlreadyRegistered(caller.clone()));
        }

        self.names.insert(caller.clone(), name.to_string());
        info!("{} registered as {:?}", caller, name);
        events.push(Event::Registered {
            identity: caller.clone(),
            name: name.to_string(),
        });

        Ok(())
    }

    /// Registered name, or the empty string.
    pub fn username(&self, identity: &Identity) -> &str {
        self.names.get(identity).map(String::as_str).unwrap_or("")
    }
}
