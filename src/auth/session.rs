use std::collections::HashMap;

use rand::Rng;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::database::{Collection, Store};

/// Default token size: 256 bits.
pub const DEFAULT_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid credentials")]
    Unauthorized,
}

/// A live session as handed back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

/// Two-way map between user ids and their single active token.
///
/// Both directions are always updated together.
#[derive(Debug)]
pub struct SessionRegistry {
    token_by_user: HashMap<String, String>,
    user_by_token: HashMap<String, String>,
    token_bytes: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_BYTES)
    }
}

impl SessionRegistry {
    pub fn new(token_bytes: usize) -> Self {
        Self {
            token_by_user: HashMap::new(),
            user_by_token: HashMap::new(),
            token_bytes,
        }
    }

    /// Authenticate by email and stored password hash.
    ///
    /// A user who is already logged in gets the same token back.
    pub fn login(
        &mut self,
        store: &Store,
        email: &Value,
        password_hash: &Value,
    ) -> Result<Session, SessionError> {
        let (user_id, user) = store
            .list(Collection::Users)
            .find(|(_, user)| user.get("email") == Some(email))
            .ok_or(SessionError::NotFound("user"))?;

        if user.get("password_hash") != Some(password_hash) {
            warn!(user_id, "Login rejected: password mismatch");
            return Err(SessionError::Unauthorized);
        }

        if let Some(token) = self.token_by_user.get(user_id) {
            debug!(user_id, "Login reused existing session");
            return Ok(Session {
                user_id: user_id.to_string(),
                token: token.clone(),
            });
        }

        let token = self.mint_token();
        self.token_by_user.insert(user_id.to_string(), token.clone());
        self.user_by_token.insert(token.clone(), user_id.to_string());
        debug!(user_id, "Session started");

        Ok(Session {
            user_id: user_id.to_string(),
            token,
        })
    }

    /// End the session identified by `token`, returning its user id.
    pub fn logout(&mut self, token: &str) -> Result<String, SessionError> {
        let user_id = self
            .user_by_token
            .remove(token)
            .ok_or(SessionError::NotFound("session"))?;
        self.token_by_user.remove(&user_id);
        debug!(%user_id, "Session ended");
        Ok(user_id)
    }

    /// Drop whatever session `user_id` holds, if any.
    pub fn end_session_for(&mut self, user_id: &str) {
        if let Some(token) = self.token_by_user.remove(user_id) {
            self.user_by_token.remove(&token);
            debug!(user_id, "Session dropped");
        }
    }

    pub fn token_for(&self, user_id: &str) -> Option<&str> {
        self.token_by_user.get(user_id).map(String::as_str)
    }

    pub fn user_for(&self, token: &str) -> Option<&str> {
        self.user_by_token.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.user_by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_by_token.is_empty()
    }

    fn mint_token(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let mut bytes = vec![0u8; self.token_bytes];
            rng.fill(bytes.as_mut_slice());
            let token = hex::encode(bytes);
            if !self.user_by_token.contains_key(&token) {
                return token;
            }
        }
    }
}
