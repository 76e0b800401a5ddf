//! Login and signup flows.
//!
//! A flow is the caller of the session store: it validates the form, marks
//! the store as loading for the duration of one network call, and records
//! the outcome. The loading flag is cleared by a guard, so it is reset on
//! success, on failure, and when the future is dropped mid-request.

use tracing::{debug, info, warn};

use crate::client::{AuthClient, LoginRequest, SignupRequest};
use crate::error::Result;
use crate::session::{PersistentStore, Session, SlotStorage};
use crate::validation::{LoginForm, SignupForm};

/// Holds `is_loading = true` until dropped.
struct LoadingGuard<'a, S: SlotStorage> {
    store: &'a PersistentStore<S>,
}

impl<'a, S: SlotStorage> LoadingGuard<'a, S> {
    fn start(store: &'a PersistentStore<S>) -> Self {
        store.set_loading(true);
        Self { store }
    }
}

impl<S: SlotStorage> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.store.set_loading(false);
    }
}

/// Log in with the given form.
///
/// Validation failures are returned before the store is touched. A
/// rejected or failed request stores its display message as the session
/// error and is returned as well.
pub async fn login<S: SlotStorage>(
    store: &PersistentStore<S>,
    client: &AuthClient,
    form: &LoginForm,
    device_token: &str,
) -> Result<Session> {
    form.validate()?;

    let request = LoginRequest::from_form(form, device_token);
    let loading = LoadingGuard::start(store);

    let result = match client.login(&request).await {
        Ok(success) => {
            info!("logged in as {}", form.email);
            store.login(success.profile, success.token);
            Ok(())
        }
        Err(e) => {
            warn!("login failed: {e}");
            store.set_error(e.user_message());
            Err(e)
        }
    };

    drop(loading);
    result.map(|()| store.snapshot())
}

/// Register a new account.
///
/// Success establishes no session; the caller is expected to send the
/// user to the login page. Failures are returned, not stored.
pub async fn signup<S: SlotStorage>(
    store: &PersistentStore<S>,
    client: &AuthClient,
    form: &SignupForm,
    device_token: &str,
) -> Result<()> {
    form.validate()?;

    let request = SignupRequest::from_form(form, device_token);
    let _loading = LoadingGuard::start(store);

    match client.signup(&request).await {
        Ok(body) => {
            debug!("signup response: {body}");
            info!("account created for {}", form.email);
            Ok(())
        }
        Err(e) => {
            warn!("signup failed: {e}");
            Err(e)
        }
    }
}
