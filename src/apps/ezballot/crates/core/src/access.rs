//! Administrator access control.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Identity};

/// Holds the single administrator identity fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    administrator: Identity,
}

impl AccessControl {
    pub fn new(administrator: Identity) -> Self {
        Self { administrator }
    }

    pub fn administrator(&self) -> &Identity {
        &self.administrator
    }

    /// Fails with [`Error::Unauthorized`] unless `caller` is the administrator.
    pub fn require_administrator(&self, caller: &Identity) -> Result<(), Error> {
        if caller != &self.administrator {
            debug!("rejected non-administrator caller {}", caller);
            return Err(Error::Unauthorized(caller.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_passes() {
        let access = AccessControl::new("admin".into());
        assert!(access.require_administrator(&"admin".into()).is_ok());
    }

    #[test]
    fn anyone_else_is_unauthorized() {
        let access = AccessControl::new("admin".into());
        assert_eq!(
            access.require_administrator(&"mallory".into()),
            Err(Error::Unauthorized("mallory".into()))
        );
    }
}
