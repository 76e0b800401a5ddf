//! Session management module.
//!
//! This module holds the authentication session: the plain [`Session`]
//! value and its transition rules, the in-memory [`SessionStore`] that
//! applies them atomically and notifies subscribers, and the
//! [`PersistentStore`] decorator that mirrors the durable subset of the
//! session into a [`SlotStorage`].

mod persist;
mod state;
mod store;

pub use persist::{FileStorage, MemoryStorage, PersistentStore, SlotStorage, STORAGE_KEY};
pub use state::{PersistedSession, Session};
pub use store::{SessionStore, Subscription};
