//! Page routing and the home page text.

use std::fmt;
use std::str::FromStr;

use crate::session::Session;

/// Pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// `/`, only for authenticated sessions.
    Home,
    /// `/login`
    Login,
    /// `/signup`
    SignUp,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Login => "/login",
            Page::SignUp => "/signup",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "/" | "" => Ok(Page::Home),
            "/login" => Ok(Page::Login),
            "/signup" => Ok(Page::SignUp),
            other => Err(format!("unknown page: {other}")),
        }
    }
}

/// The page actually shown when `requested` is navigated to.
///
/// Home redirects to login unless the session is authenticated.
pub fn resolve(requested: Page, session: &Session) -> Page {
    match requested {
        Page::Home if !session.is_authenticated => Page::Login,
        page => page,
    }
}

/// Email of the logged-in profile, if the profile carries one.
pub fn profile_email(session: &Session) -> Option<&str> {
    let user = session.user.as_ref()?;
    user.get("email")
        .or_else(|| user.pointer("/result/email"))
        .and_then(|v| v.as_str())
}

/// Home page heading.
pub fn greeting(session: &Session) -> String {
    format!("Logged in as {}", profile_email(session).unwrap_or(""))
        .trim_end()
        .to_string()
}
