//! API integration tests.
//!
//! These tests run the login and signup flows end-to-end against a mock
//! authentication API served by axum on an ephemeral local port.

use std::sync::{Arc, Mutex};

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use oms_auth::error::NETWORK_ERROR_MESSAGE;
use oms_auth::{
    app, flow, ApiConfig, AuthClient, AuthError, FileStorage, LoginForm, PersistentStore,
    SignupForm, SlotStorage, STORAGE_KEY,
};

// ============================================================================
// Mock API
// ============================================================================

async fn login_handler(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match (email, password) {
        ("john@example.com", "secret1") => (
            StatusCode::OK,
            Json(json!({
                "status": true,
                "result": {
                    "token": "tok-123",
                    "email": "john@example.com",
                    "device_token": body["device_token"]
                }
            })),
        ),
        ("notoken@example.com", _) => (
            StatusCode::OK,
            Json(json!({"status": true, "result": {}})),
        ),
        ("silent@example.com", _) => (StatusCode::UNAUTHORIZED, Json(json!({"status": false}))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        ),
    }
}

async fn signup_handler(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["mode"] != 1 || body["sno"] != 0 || body.get("confirm_password").is_some() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "bad payload"})),
        );
    }

    match body["email"].as_str() {
        Some("taken@example.com") => (
            StatusCode::CONFLICT,
            Json(json!({"message": "Email already exists"})),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({"status": true, "message": "Registered"})),
        ),
    }
}

async fn unauthorized_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!("Unauthorized")))
}

async fn broken_handler() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Serve the mock API and return its base URL.
async fn spawn_api() -> String {
    let app = Router::new()
        .route("/api/login", post(login_handler))
        .route("/api/signup", post(signup_handler))
        .route("/broken/login", post(broken_handler))
        .route("/broken/signup", post(broken_handler))
        .route("/plain/login", post(unauthorized_handler))
        .route("/plain/signup", post(unauthorized_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn client(base_url: &str) -> AuthClient {
    AuthClient::new(ApiConfig::new(base_url)).unwrap()
}

fn signup_form(email: &str) -> SignupForm {
    SignupForm {
        name: "John Doe".into(),
        company: "Acme Corp".into(),
        email: email.into(),
        phone: "4156454445".into(),
        type_code: "123456".into(),
        password: "password1".into(),
        confirm_password: "password1".into(),
    }
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_success_persists_session() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let form = LoginForm::new("john@example.com", "secret1");
    let session = flow::login(&store, &client(&format!("{base}/api")), &form, "dev-7")
        .await
        .unwrap();

    assert!(session.is_authenticated);
    assert!(!session.is_loading);
    assert!(session.error.is_none());
    assert_eq!(session.token.as_deref(), Some("tok-123"));

    // The whole response body is the profile
    let user = session.user.as_ref().unwrap();
    assert_eq!(user["status"], true);
    assert_eq!(user["result"]["device_token"], "dev-7");
    assert_eq!(app::greeting(&session), "Logged in as john@example.com");

    let raw = FileStorage::new(dir.path()).read(STORAGE_KEY).unwrap().unwrap();
    let slot: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(slot["token"], "tok-123");
    assert_eq!(slot["isAuthenticated"], true);
    assert!(slot.get("isLoading").is_none());
    assert!(slot.get("error").is_none());
}

#[tokio::test]
async fn test_login_survives_restart() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();

    {
        let store = PersistentStore::open(FileStorage::new(dir.path()));
        let form = LoginForm::new("john@example.com", "secret1");
        flow::login(&store, &client(&format!("{base}/api")), &form, "1234")
            .await
            .unwrap();
    }

    let store = PersistentStore::open(FileStorage::new(dir.path()));
    let session = store.snapshot();
    assert!(session.is_authenticated);
    assert_eq!(session.token.as_deref(), Some("tok-123"));
    assert_eq!(app::resolve(app::Page::Home, &session), app::Page::Home);
}

#[tokio::test]
async fn test_login_rejected_with_message() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let form = LoginForm::new("john@example.com", "wrong-pass");
    let err = flow::login(&store, &client(&format!("{base}/api")), &form, "1234")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
    let session = store.snapshot();
    assert!(!session.is_authenticated);
    assert!(!session.is_loading);
    assert_eq!(session.error.as_deref(), Some("Invalid credentials"));
}

#[tokio::test]
async fn test_login_rejected_without_message_uses_default() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let form = LoginForm::new("silent@example.com", "secret1");
    let _ = flow::login(&store, &client(&format!("{base}/api")), &form, "1234").await;

    assert_eq!(
        store.snapshot().error.as_deref(),
        Some("Invalid email or password")
    );
}

#[tokio::test]
async fn test_login_rejected_with_string_body_uses_default() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let form = LoginForm::new("john@example.com", "secret1");
    let err = flow::login(&store, &client(&format!("{base}/plain")), &form, "1234")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
    let session = store.snapshot();
    assert!(!session.is_loading);
    assert_eq!(session.error.as_deref(), Some("Invalid email or password"));
}

#[tokio::test]
async fn test_login_success_without_token_is_network_error() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let form = LoginForm::new("notoken@example.com", "secret1");
    let err = flow::login(&store, &client(&format!("{base}/api")), &form, "1234")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MalformedResponse(_)));
    let session = store.snapshot();
    assert!(!session.is_authenticated);
    assert_eq!(session.error.as_deref(), Some(NETWORK_ERROR_MESSAGE));
}

#[tokio::test]
async fn test_login_non_json_error_is_network_error() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let form = LoginForm::new("john@example.com", "secret1");
    let err = flow::login(&store, &client(&format!("{base}/broken")), &form, "1234")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MalformedResponse(_)));
    assert_eq!(store.snapshot().error.as_deref(), Some(NETWORK_ERROR_MESSAGE));
    assert!(!store.snapshot().is_loading);
}

#[tokio::test]
async fn test_login_after_failure_clears_error() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));
    let api = client(&format!("{base}/api"));

    let bad = LoginForm::new("john@example.com", "wrong-pass");
    let _ = flow::login(&store, &api, &bad, "1234").await;
    assert!(store.snapshot().error.is_some());

    let good = LoginForm::new("john@example.com", "secret1");
    let session = flow::login(&store, &api, &good, "1234").await.unwrap();
    assert!(session.error.is_none());
}

#[tokio::test]
async fn test_login_loading_flag_sequence() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let (_, _sub) = store.subscribe(move |s| {
        sink.lock().unwrap().push((s.is_loading, s.is_authenticated));
    });

    let form = LoginForm::new("john@example.com", "secret1");
    flow::login(&store, &client(&format!("{base}/api")), &form, "1234")
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(*seen, vec![(true, false), (true, true), (false, true)]);
}

#[tokio::test]
async fn test_logout_after_login_persists_empty_session() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();

    {
        let store = PersistentStore::open(FileStorage::new(dir.path()));
        let form = LoginForm::new("john@example.com", "secret1");
        flow::login(&store, &client(&format!("{base}/api")), &form, "1234")
            .await
            .unwrap();
        store.logout();
    }

    let store = PersistentStore::open(FileStorage::new(dir.path()));
    let session = store.snapshot();
    assert!(!session.is_authenticated);
    assert!(session.user.is_none());
    assert!(session.token.is_none());
    assert_eq!(app::resolve(app::Page::Home, &session), app::Page::Login);
}

// ============================================================================
// Signup Tests
// ============================================================================

#[tokio::test]
async fn test_signup_success_does_not_authenticate() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    flow::signup(
        &store,
        &client(&format!("{base}/api")),
        &signup_form("new@example.com"),
        "1234",
    )
    .await
    .unwrap();

    let session = store.snapshot();
    assert!(!session.is_authenticated);
    assert!(!session.is_loading);
    assert!(session.error.is_none());
}

#[tokio::test]
async fn test_signup_rejected_is_returned_not_stored() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let err = flow::signup(
        &store,
        &client(&format!("{base}/api")),
        &signup_form("taken@example.com"),
        "1234",
    )
    .await
    .unwrap_err();

    assert_eq!(err.user_message(), "Email already exists");
    assert!(matches!(err, AuthError::Rejected { status: 409, .. }));
    assert!(store.snapshot().error.is_none());
}

#[tokio::test]
async fn test_signup_rejected_with_string_body_uses_default() {
    let base = spawn_api().await;
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let err = flow::signup(
        &store,
        &client(&format!("{base}/plain")),
        &signup_form("new@example.com"),
        "1234",
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AuthError::Rejected { status: 401, .. }));
    assert_eq!(err.user_message(), "Signup failed. Please try again.");
}

#[tokio::test]
async fn test_signup_invalid_form_sends_nothing() {
    let dir = TempDir::new().unwrap();
    let store = PersistentStore::open(FileStorage::new(dir.path()));

    let form = SignupForm {
        confirm_password: "mismatch".into(),
        ..signup_form("new@example.com")
    };
    // Nothing listens here; validation must fail first
    let err = flow::signup(&store, &client("http://127.0.0.1:9/api"), &form, "1234")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Validation(_)));
    assert!(FileStorage::new(dir.path()).read(STORAGE_KEY).unwrap().is_none());
}
