//! # oms-auth
//!
//! Authentication client for the OMS API with a persisted local session.
//!
//! The heart of the crate is the session store: one explicitly constructed
//! object holding the current profile, token, authenticated flag, loading
//! flag and last error. Every mutation is a single atomic update, and the
//! [`PersistentStore`] decorator mirrors `{user, token, isAuthenticated}`
//! into a durable slot so a restart restores the login.
//!
//! ## Features
//!
//! - **Session store**: atomic transitions with change subscriptions
//! - **Persistence**: file-backed slot, best-effort writes, tolerant reads
//! - **API client**: login and signup over HTTPS with `reqwest`
//! - **Flows**: form validation and guaranteed loading-flag cleanup
//!
//! ## Quick Start
//!
//! ```no_run
//! use oms_auth::{flow, ApiConfig, AuthClient, FileStorage, LoginForm, PersistentStore};
//!
//! #[tokio::main]
//! async fn main() -> oms_auth::Result<()> {
//!     oms_auth::logging::try_init("info").ok();
//!
//!     // Rehydrates a previous login if one was persisted
//!     let store = PersistentStore::open(FileStorage::new("/tmp/oms-auth"));
//!     let client = AuthClient::new(ApiConfig::default())?;
//!
//!     if !store.snapshot().is_authenticated {
//!         let form = LoginForm::new("john@example.com", "secret1");
//!         flow::login(&store, &client, &form, "1234").await?;
//!     }
//!
//!     println!("{}", oms_auth::app::greeting(&store.snapshot()));
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod logging;
pub mod session;
pub mod validation;

// Re-export commonly used types
pub use app::Page;
pub use client::{ApiConfig, AuthClient, LoginRequest, LoginSuccess, SignupRequest};
pub use error::{AuthError, Result};
pub use session::{
    FileStorage, MemoryStorage, PersistedSession, PersistentStore, Session, SessionStore,
    SlotStorage, Subscription, STORAGE_KEY,
};
pub use validation::{LoginForm, SignupForm, ValidationError};
