//! Sessions for Kairan.
//!
//! A [`Session`] is the caller's resolved identity. It is an ordinary value
//! handed to every board call; keeping it alive between requests is the job
//! of a [`SessionCarrier`] owned by the transport.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{Role, User};

/// Identity established at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Username of the signed-in account.
    pub username: String,
    /// Role of the signed-in account.
    pub role: Role,
}

impl Session {
    /// Create a session for the given identity.
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Check if the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Session {
    fn from(user: &User) -> Self {
        Self::new(user.username.clone(), user.role)
    }
}

/// Transport-side holder of the current session.
pub trait SessionCarrier {
    /// The identity currently carried, if any.
    fn current_identity(&self) -> Option<Session>;

    /// Carry `identity` from now on, replacing any previous one.
    fn establish(&mut self, identity: Session);

    /// Forget the carried identity.
    fn clear(&mut self);
}

/// A single slot, e.g. one per connection.
impl SessionCarrier for Option<Session> {
    fn current_identity(&self) -> Option<Session> {
        self.clone()
    }

    fn establish(&mut self, identity: Session) {
        *self = Some(identity);
    }

    fn clear(&mut self) {
        *self = None;
    }
}

/// Token-keyed in-memory session store shared by request handlers.
///
/// Cloning is cheap; clones share the same sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionManager {
    /// Create an empty session manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session and return its freshly generated token.
    pub fn establish(&self, session: Session) -> String {
        let token = Uuid::new_v4().to_string();
        info!(username = %session.username, role = %session.role, "Session established");
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), session);
        token
    }

    /// Look up the session behind a token.
    pub fn get(&self, token: &str) -> Option<Session> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    /// Remove a session. Returns false if the token was unknown.
    pub fn clear(&self, token: &str) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
        match removed {
            Some(session) => {
                info!(username = %session.username, "Session cleared");
                true
            }
            None => {
                debug!("Logout: session not found");
                false
            }
        }
    }

    /// Get the number of active sessions.
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Bind a carrier to the token presented by a request (e.g. a cookie value).
    pub fn carrier(&self, token: Option<String>) -> TokenCarrier {
        TokenCarrier {
            manager: self.clone(),
            token,
        }
    }
}

/// [`SessionCarrier`] view of one token in a [`SessionManager`].
#[derive(Debug, Clone)]
pub struct TokenCarrier {
    manager: SessionManager,
    token: Option<String>,
}

impl TokenCarrier {
    /// Token to hand back to the client, if a session is carried.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl SessionCarrier for TokenCarrier {
    fn current_identity(&self) -> Option<Session> {
        self.token.as_deref().and_then(|t| self.manager.get(t))
    }

    fn establish(&mut self, identity: Session) {
        // A fresh token on every login.
        if let Some(old) = self.token.take() {
            self.manager.clear(&old);
        }
        self.token = Some(self.manager.establish(identity));
    }

    fn clear(&mut self) {
        if let Some(token) = self.token.take() {
            self.manager.clear(&token);
        }
    }
}
