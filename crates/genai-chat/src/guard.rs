use std::collections::HashMap;

use crate::errors::AuthorizationError;

/// Name of the query parameter carrying the shared secret
pub const KEY_PARAM: &str = "key";

/// Gates each request on a shared secret passed in the url
///
/// An empty secret disables the check entirely, which is how the app is run locally.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    secret_key: String,
}

impl AccessGuard {
    pub fn new<S: Into<String>>(secret_key: S) -> Self {
        Self {
            secret_key: secret_key.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.secret_key.is_empty()
    }

    pub fn check(&self, query: &HashMap<String, String>) -> Result<(), AuthorizationError> {
        if !self.is_enabled() {
            return Ok(());
        }

        match query.get(KEY_PARAM) {
            None => Err(AuthorizationError::MissingKey),
            Some(key) if *key != self.secret_key => {
                Err(AuthorizationError::InvalidKey(key.clone()))
            }
            Some(_) => Ok(()),
        }
    }
}
