//! HTTP client for the remote authentication API.
//!
//! The client only classifies outcomes; it never touches the session
//! store. See [`crate::flow`] for the callers that do.

mod types;

pub use types::{
    rejection_message, LoginRequest, LoginSuccess, SignupRequest, DEFAULT_DEVICE_TOKEN,
    DEFAULT_INFO,
};

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AuthError, Result};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://oms.wilerhub.com/api";

/// Message used when a rejected login carries no `message`.
pub const LOGIN_REJECTED_MESSAGE: &str = "Invalid email or password";

/// Message used when a rejected signup carries no `message`.
pub const SIGNUP_REJECTED_MESSAGE: &str = "Signup failed. Please try again.";

/// API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL; endpoints are appended as `/login` and `/signup`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of an endpoint.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Client for the login and signup endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl AuthClient {
    /// Build a client from the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("oms-auth/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Submit credentials.
    ///
    /// On success the whole response body becomes the profile and the
    /// token is read from `result.token`.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginSuccess> {
        let body = self.post("login", request, LOGIN_REJECTED_MESSAGE).await?;
        LoginSuccess::from_body(body)
            .ok_or_else(|| AuthError::MalformedResponse("missing string at result.token".into()))
    }

    /// Submit a registration. Success does not log the user in.
    pub async fn signup(&self, request: &SignupRequest) -> Result<Value> {
        self.post("signup", request, SIGNUP_REJECTED_MESSAGE).await
    }

    /// POST a JSON body and classify the response.
    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        rejected_message: &str,
    ) -> Result<Value> {
        let url = self.config.endpoint(path);
        debug!("POST {url}");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text)
                .map_err(|e| AuthError::MalformedResponse(format!("{path}: {e}")));
        }

        let error: Value = serde_json::from_str(&text)
            .map_err(|e| AuthError::MalformedResponse(format!("{path} ({status}): {e}")))?;
        let message = rejection_message(&error)
            .unwrap_or(rejected_message)
            .to_string();

        warn!(status = status.as_u16(), "{path} rejected: {message}");
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
