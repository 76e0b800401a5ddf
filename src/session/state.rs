//! Session value and its transition rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current authentication state.
///
/// The store hands out clones of this value; assigning to a snapshot's
/// fields never changes the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque profile record returned by the login endpoint.
    pub user: Option<Value>,
    /// Opaque credential string.
    pub token: Option<String>,
    /// True from a successful login until the next logout.
    pub is_authenticated: bool,
    /// True while the caller has an authentication request in flight.
    pub is_loading: bool,
    /// Last error message set by the caller.
    pub error: Option<String>,
}

impl Session {
    /// Create an empty, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a session from a persisted projection.
    ///
    /// Transient fields always start at their defaults.
    pub fn rehydrate(persisted: PersistedSession) -> Self {
        Self {
            user: persisted.user,
            token: persisted.token,
            is_authenticated: persisted.is_authenticated,
            is_loading: false,
            error: None,
        }
    }

    /// Record a successful login. The profile and token are trusted as given.
    pub fn login(&mut self, user: Value, token: String) {
        self.user = Some(user);
        self.token = Some(token);
        self.is_authenticated = true;
        self.error = None;
    }

    /// Drop every credential and the last error. `is_loading` is kept.
    pub fn logout(&mut self) {
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
        self.error = None;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// The subset of this session that survives a restart.
    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            token: self.token.clone(),
            is_authenticated: self.is_authenticated,
        }
    }
}

/// Durable projection of a [`Session`]: exactly `user`, `token` and
/// `isAuthenticated`.
///
/// `user` and `token` may be `null` or missing; `isAuthenticated` must be a
/// boolean for the slot to count as well-formed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistedSession {
    pub user: Option<Value>,
    pub token: Option<String>,
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
}
