//! In-memory session store with change subscriptions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde_json::Value;

use super::Session;

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

/// Registered change listeners, keyed by subscription id.
#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener)>>,
}

impl Listeners {
    fn add(&self, listener: Listener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn remove(&self, id: u64) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(entry_id, _)| *entry_id != id);
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    fn notify(&self, session: &Session) {
        // Copy out so listeners may subscribe or cancel while being called
        let listeners: Vec<Listener> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(session);
        }
    }
}

/// Handle for a change listener registered with [`SessionStore::subscribe`].
///
/// The listener stays registered until this handle is cancelled or dropped.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    /// Unregister the listener.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the store this subscription belongs to is still alive.
    pub fn store_alive(&self) -> bool {
        self.listeners.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Single authority for authentication state.
///
/// Every operation is one atomic update: readers never observe a
/// partially applied change. Commits are serialized, so post-commit work
/// and listener calls run in commit order. Operations cannot fail; a
/// poisoned lock is recovered rather than reported.
pub struct SessionStore {
    state: RwLock<Session>,
    /// Held from a change until its listeners have run.
    commit: Mutex<()>,
    listeners: Arc<Listeners>,
}

impl SessionStore {
    /// Create a store holding an empty session.
    pub fn new() -> Self {
        Self::with_session(Session::default())
    }

    /// Create a store starting from the given session.
    pub fn with_session(session: Session) -> Self {
        Self {
            state: RwLock::new(session),
            commit: Mutex::new(()),
            listeners: Arc::new(Listeners::default()),
        }
    }

    /// Record a successful login.
    pub fn login(&self, user: Value, token: impl Into<String>) -> Session {
        let token = token.into();
        self.apply(move |s| s.login(user, token))
    }

    /// Reset to the unauthenticated state, keeping `is_loading`.
    pub fn logout(&self) -> Session {
        self.apply(Session::logout)
    }

    pub fn set_loading(&self, loading: bool) -> Session {
        self.apply(|s| s.set_loading(loading))
    }

    pub fn set_error(&self, message: impl Into<String>) -> Session {
        let message = message.into();
        self.apply(move |s| s.set_error(message))
    }

    pub fn clear_error(&self) -> Session {
        self.apply(Session::clear_error)
    }

    /// Get a copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register a listener called with the new session after every change.
    ///
    /// Returns the current session alongside the subscription handle.
    /// Listeners may read the store but must not mutate it: a mutation from
    /// inside a listener blocks on the commit in progress.
    pub fn subscribe<F>(&self, listener: F) -> (Session, Subscription)
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let id = self.listeners.add(Arc::new(listener));
        let subscription = Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        };
        (self.snapshot(), subscription)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn apply<F>(&self, change: F) -> Session
    where
        F: FnOnce(&mut Session),
    {
        self.apply_then(change, |_| {})
    }

    /// Apply one change under the write lock, run `after` on the committed
    /// session, then notify listeners.
    ///
    /// The whole sequence holds the commit lock, so two concurrent changes
    /// reach `after` and the listeners in the order they were committed.
    /// Readers are only excluded while `change` runs.
    pub(crate) fn apply_then<F, A>(&self, change: F, after: A) -> Session
    where
        F: FnOnce(&mut Session),
        A: FnOnce(&Session),
    {
        let _commit = self.commit.lock().unwrap_or_else(PoisonError::into_inner);

        let committed = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            change(&mut state);
            state.clone()
        };

        after(&committed);
        self.listeners.notify(&committed);
        committed
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.snapshot())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
