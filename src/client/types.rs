//! Request and response types of the remote authentication API.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::{LoginForm, SignupForm};

/// Device token sent when none is configured.
pub const DEFAULT_DEVICE_TOKEN: &str = "1234";

/// Client description sent with signups.
pub const DEFAULT_INFO: &str = "Web Application";

/// Request body for `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_token: String,
    /// Additional caller-supplied fields, sent at the top level.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoginRequest {
    pub fn from_form(form: &LoginForm, device_token: impl Into<String>) -> Self {
        Self {
            email: form.email.clone(),
            password: form.password.clone(),
            device_token: device_token.into(),
            extra: Map::new(),
        }
    }

    /// Add a top-level field to the request body.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Request body for `POST /signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub compname: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(rename = "type")]
    pub type_code: String,
    pub device_token: String,
    pub info: String,
    pub mode: u8,
    pub sno: u32,
}

impl SignupRequest {
    /// Build the payload from a form; `confirm_password` is never sent.
    pub fn from_form(form: &SignupForm, device_token: impl Into<String>) -> Self {
        Self {
            name: form.name.clone(),
            compname: form.company.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            password: form.password.clone(),
            type_code: form.type_code.clone(),
            device_token: device_token.into(),
            info: DEFAULT_INFO.to_string(),
            mode: 1,
            sno: 0,
        }
    }
}

/// Non-empty `message` of a rejected request's body, if it has one.
///
/// Any JSON shape is accepted; a body that is not an object has no message.
pub fn rejection_message(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSuccess {
    /// The full response body, kept as the opaque profile.
    pub profile: Value,
    /// Credential read from `result.token`.
    pub token: String,
}

impl LoginSuccess {
    /// Split a success body into profile and token.
    ///
    /// Returns `None` when `result.token` is missing or not a string.
    pub fn from_body(body: Value) -> Option<Self> {
        let token = body.pointer("/result/token")?.as_str()?.to_string();
        Some(Self {
            profile: body,
            token,
        })
    }
}
