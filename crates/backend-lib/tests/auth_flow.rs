// crates/backend-lib/tests/auth_flow.rs

//! End-to-end exercises of the auth service and the HTTP surface,
//! running against flat-file storage in a temp directory and a mailer
//! that records instead of sending.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use songa_backend_lib::auth::encode_uid;
use songa_backend_lib::config::Settings;
use songa_backend_lib::email::Mailer;
use songa_backend_lib::error::AppError;
use songa_backend_lib::router::create_router;
use songa_backend_lib::storage::{FlatFileStorage, Storage};
use songa_backend_lib::AppState;
use songa_common::{RegisterRequest, Role, TokenPair};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<(String, String, String)>>>,
    fail: bool,
}

impl RecordingMailer {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        _html: &str,
        text: &str,
    ) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::Internal("smtp relay refused".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), text.to_string()));
        Ok(())
    }
}

fn test_settings(dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.data_dir = dir.path().to_path_buf();
    settings.jwt.secret = "integration-test-secret".to_string();
    settings
}

fn test_state(mailer: RecordingMailer) -> (Arc<AppState<FlatFileStorage>>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let settings = test_settings(&dir);
    let storage = FlatFileStorage::new(dir.path()).unwrap();
    let state = Arc::new(AppState::new(storage, settings, Arc::new(mailer)));
    (state, dir)
}

fn sample_registration() -> RegisterRequest {
    RegisterRequest {
        email: Some("jane@example.com".to_string()),
        phone: Some("+254712345678".to_string()),
        first_name: Some("Jane".to_string()),
        last_name: Some("Wanjiru".to_string()),
        username: Some("jane".to_string()),
        business_name: Some("Jane Traders".to_string()),
        password: Some("SecureP@ssw0rd1".to_string()),
        ..RegisterRequest::default()
    }
}

/// Pull the uid/token query values out of a captured reset email body.
fn parse_reset_link(body: &str) -> (String, String) {
    let start = body.find("?uid=").expect("email contains a reset link") + 5;
    let rest = &body[start..];
    let amp = rest.find("&token=").unwrap();
    let uid = rest[..amp].to_string();
    let token_rest = &rest[amp + 7..];
    let end = token_rest
        .find(char::is_whitespace)
        .unwrap_or(token_rest.len());
    (uid, token_rest[..end].to_string())
}

#[tokio::test]
async fn test_login_with_email_and_every_phone_shape() {
    let (state, _dir) = test_state(RecordingMailer::default());
    let user = state.auth.register(sample_registration()).await.unwrap();

    for identifier in [
        "jane@example.com",
        "0712345678",
        "254712345678",
        "712345678",
        "+254712345678",
    ] {
        let pair = state
            .auth
            .login(identifier, "SecureP@ssw0rd1")
            .await
            .unwrap_or_else(|e| panic!("login with {identifier} failed: {e}"));

        // the embedded claims mirror the user's current field values
        let claims = state.issuer.decode_access(&pair.access).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.phone, "+254712345678");
        assert_eq!(claims.business_name, "Jane Traders");
        assert_eq!(claims.username, "jane");
        assert_eq!(claims.middle_name, "");
        assert_eq!(claims.role, Role::Client);
        assert!(!claims.is_verified);
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (state, _dir) = test_state(RecordingMailer::default());
    state.auth.register(sample_registration()).await.unwrap();

    let wrong_password = state
        .auth
        .login("jane@example.com", "WrongP@ssw0rd1")
        .await
        .unwrap_err();
    let unknown_user = state
        .auth
        .login("ghost@example.com", "SecureP@ssw0rd1")
        .await
        .unwrap_err();
    let bad_identifier = state
        .auth
        .login("notanumber", "SecureP@ssw0rd1")
        .await
        .unwrap_err();

    for err in [&wrong_password, &unknown_user, &bad_identifier] {
        assert!(matches!(*err, AppError::InvalidCredentials));
        assert_eq!(err.sanitized_message(), "Invalid credentials");
    }
}

#[tokio::test]
async fn test_registration_requires_email_and_phone() {
    let (state, _dir) = test_state(RecordingMailer::default());

    let mut missing_email = sample_registration();
    missing_email.email = None;
    assert!(matches!(
        state.auth.register(missing_email).await,
        Err(AppError::InvalidInput(_))
    ));

    let mut blank_phone = sample_registration();
    blank_phone.phone = Some("  ".to_string());
    assert!(matches!(
        state.auth.register(blank_phone).await,
        Err(AppError::InvalidInput(_))
    ));

    // phone must already be E.164; registration never normalizes
    let mut local_phone = sample_registration();
    local_phone.phone = Some("0712345678".to_string());
    assert!(matches!(
        state.auth.register(local_phone).await,
        Err(AppError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_passwordless_registration_cannot_login() {
    let (state, _dir) = test_state(RecordingMailer::default());

    let mut request = sample_registration();
    request.password = None;
    let user = state.auth.register(request).await.unwrap();
    assert!(user.password_hash.is_none());

    assert!(matches!(
        state.auth.login("jane@example.com", "anything").await,
        Err(AppError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (state, _dir) = test_state(RecordingMailer::default());
    state.auth.register(sample_registration()).await.unwrap();

    let mut same_email = sample_registration();
    same_email.phone = Some("+254700000001".to_string());
    assert!(matches!(
        state.auth.register(same_email).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_admin_registration_sets_is_admin() {
    let (state, _dir) = test_state(RecordingMailer::default());
    let user = state
        .auth
        .create_superuser("root@example.com", "+254700000009", "SecureP@ssw0rd1")
        .await
        .unwrap();
    assert_eq!(user.role, Role::Admin);
    assert!(user.is_admin);
    assert!(user.is_active);
}

#[tokio::test]
async fn test_refresh_rotates_and_denylists() {
    let (state, _dir) = test_state(RecordingMailer::default());
    state.auth.register(sample_registration()).await.unwrap();
    let pair = state
        .auth
        .login("jane@example.com", "SecureP@ssw0rd1")
        .await
        .unwrap();

    let rotated = state.auth.refresh(&pair.refresh).await.unwrap();
    assert_ne!(rotated.refresh, pair.refresh);
    assert!(state.issuer.decode_access(&rotated.access).is_ok());

    // the presented token was denylisted on rotation and can never
    // re-issue
    assert!(matches!(
        state.auth.refresh(&pair.refresh).await,
        Err(AppError::InvalidToken)
    ));

    // the rotated replacement still works
    assert!(state.auth.refresh(&rotated.refresh).await.is_ok());
}

#[tokio::test]
async fn test_logout_denylists_refresh_token() {
    let (state, _dir) = test_state(RecordingMailer::default());
    state.auth.register(sample_registration()).await.unwrap();
    let pair = state
        .auth
        .login("jane@example.com", "SecureP@ssw0rd1")
        .await
        .unwrap();

    state.auth.logout(&pair.refresh).await.unwrap();
    assert!(matches!(
        state.auth.refresh(&pair.refresh).await,
        Err(AppError::InvalidToken)
    ));

    assert!(matches!(
        state.auth.logout("").await,
        Err(AppError::MissingToken)
    ));
    assert!(matches!(
        state.auth.logout("not-a-jwt").await,
        Err(AppError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_change_password_flow() {
    let (state, _dir) = test_state(RecordingMailer::default());
    let user = state.auth.register(sample_registration()).await.unwrap();

    assert!(matches!(
        state
            .auth
            .change_password(&user, "wrong", "NewP@ssw0rd1", "NewP@ssw0rd1")
            .await,
        Err(AppError::WrongCurrentPassword)
    ));
    assert!(matches!(
        state
            .auth
            .change_password(&user, "SecureP@ssw0rd1", "NewP@ssw0rd1", "Different1@")
            .await,
        Err(AppError::PasswordMismatch)
    ));
    assert!(matches!(
        state
            .auth
            .change_password(&user, "SecureP@ssw0rd1", "weak", "weak")
            .await,
        Err(AppError::PolicyViolation(_))
    ));

    state
        .auth
        .change_password(&user, "SecureP@ssw0rd1", "NewP@ssw0rd1", "NewP@ssw0rd1")
        .await
        .unwrap();

    assert!(matches!(
        state.auth.login("jane@example.com", "SecureP@ssw0rd1").await,
        Err(AppError::InvalidCredentials)
    ));
    assert!(state
        .auth
        .login("jane@example.com", "NewP@ssw0rd1")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_reset_flow_end_to_end() {
    let mailer = RecordingMailer::default();
    let (state, _dir) = test_state(mailer.clone());
    state.auth.register(sample_registration()).await.unwrap();

    state.auth.request_reset("jane@example.com").await.unwrap();
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "jane@example.com");
    assert_eq!(sent[0].1, "Password Reset Request");
    assert!(sent[0].2.contains("songaai://reset-password/?uid="));

    let (uid, token) = parse_reset_link(&sent[0].2);
    state
        .auth
        .confirm_reset(&uid, &token, "Fresh@Pass1", "Fresh@Pass1")
        .await
        .unwrap();

    assert!(state
        .auth
        .login("jane@example.com", "Fresh@Pass1")
        .await
        .is_ok());

    // the token was consumed by the successful confirm
    assert!(matches!(
        state
            .auth
            .confirm_reset(&uid, &token, "Another@Pass1", "Another@Pass1")
            .await,
        Err(AppError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_reset_confirm_rejects_bad_inputs() {
    let mailer = RecordingMailer::default();
    let (state, _dir) = test_state(mailer.clone());
    let user = state.auth.register(sample_registration()).await.unwrap();

    state.auth.request_reset("jane@example.com").await.unwrap();
    let (uid, token) = parse_reset_link(&mailer.sent()[0].2);

    // garbled uid
    assert!(matches!(
        state
            .auth
            .confirm_reset("!!!", &token, "Fresh@Pass1", "Fresh@Pass1")
            .await,
        Err(AppError::InvalidUserOrToken)
    ));
    // uid of a nonexistent user
    let ghost = encode_uid(uuid::Uuid::new_v4());
    assert!(matches!(
        state
            .auth
            .confirm_reset(&ghost, &token, "Fresh@Pass1", "Fresh@Pass1")
            .await,
        Err(AppError::InvalidUserOrToken)
    ));
    // tampered token
    assert!(matches!(
        state
            .auth
            .confirm_reset(&uid, "bogus-token-0000000000", "Fresh@Pass1", "Fresh@Pass1")
            .await,
        Err(AppError::InvalidToken)
    ));
    // mismatched passwords
    assert!(matches!(
        state
            .auth
            .confirm_reset(&uid, &token, "Fresh@Pass1", "Other@Pass1")
            .await,
        Err(AppError::PasswordMismatch)
    ));
    // policy-violating password
    assert!(matches!(
        state
            .auth
            .confirm_reset(&uid, &token, "allwrong", "allwrong")
            .await,
        Err(AppError::PolicyViolation(_))
    ));

    // deactivating the account invalidates the outstanding token
    let mut deactivated = user.clone();
    deactivated.is_active = false;
    state.storage.update_user(&deactivated).await.unwrap();
    assert!(matches!(
        state
            .auth
            .confirm_reset(&uid, &token, "Fresh@Pass1", "Fresh@Pass1")
            .await,
        Err(AppError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_reset_request_is_enumeration_safe() {
    let mailer = RecordingMailer::default();
    let (state, _dir) = test_state(mailer.clone());
    state.auth.register(sample_registration()).await.unwrap();

    // unknown email: same Ok, nothing sent
    state.auth.request_reset("ghost@example.com").await.unwrap();
    assert!(mailer.sent().is_empty());

    // delivery failure: still Ok
    let failing = RecordingMailer::failing();
    let (state, _dir) = test_state(failing);
    state.auth.register(sample_registration()).await.unwrap();
    state.auth.request_reset("jane@example.com").await.unwrap();
}

// --- HTTP surface ---

async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_http_register_login_and_admin_delete() {
    let (state, _dir) = test_state(RecordingMailer::default());
    state
        .auth
        .create_superuser("root@example.com", "+254700000009", "SecureP@ssw0rd1")
        .await
        .unwrap();
    let router = create_router(state);

    let (status, _) = json_request(
        &router,
        "POST",
        "/api/auth/register/",
        None,
        serde_json::json!({
            "email": "jane@example.com",
            "phone": "+254712345678",
            "first_name": "Jane",
            "last_name": "Wanjiru",
            "password": "SecureP@ssw0rd1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // login with the phone form
    let (status, body) = json_request(
        &router,
        "POST",
        "/api/auth/login/",
        None,
        serde_json::json!({"email": "0712345678", "password": "SecureP@ssw0rd1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let pair: TokenPair = serde_json::from_value(body).unwrap();

    // /token/ reports bad credentials as 401, /login/ as 400
    let (status, _) = json_request(
        &router,
        "POST",
        "/api/auth/token/",
        None,
        serde_json::json!({"email": "jane@example.com", "password": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = json_request(
        &router,
        "POST",
        "/api/auth/login/",
        None,
        serde_json::json!({"email": "jane@example.com", "password": "nope"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // refresh via HTTP
    let (status, body) = json_request(
        &router,
        "POST",
        "/api/auth/token/refresh/",
        None,
        serde_json::json!({"refresh": pair.refresh}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("access").is_some());

    // a non-admin cannot delete accounts
    let (status, _) = json_request(
        &router,
        "DELETE",
        "/api/auth/users/root@example.com/",
        Some(&pair.access),
        serde_json::Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // the admin can
    let (_, admin_body) = json_request(
        &router,
        "POST",
        "/api/auth/token/",
        None,
        serde_json::json!({"email": "root@example.com", "password": "SecureP@ssw0rd1"}),
    )
    .await;
    let admin_pair: TokenPair = serde_json::from_value(admin_body).unwrap();

    let (status, _) = json_request(
        &router,
        "DELETE",
        "/api/auth/users/jane@example.com/",
        Some(&admin_pair.access),
        serde_json::Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = json_request(
        &router,
        "DELETE",
        "/api/auth/users/jane@example.com/",
        Some(&admin_pair.access),
        serde_json::Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_http_catalog_requires_bearer_and_round_trips() {
    let (state, _dir) = test_state(RecordingMailer::default());
    state.auth.register(sample_registration()).await.unwrap();
    let router = create_router(state);

    // no token, no catalog
    let (status, _) = json_request(
        &router,
        "GET",
        "/api/products/",
        None,
        serde_json::Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = json_request(
        &router,
        "POST",
        "/api/auth/login/",
        None,
        serde_json::json!({"email": "jane@example.com", "password": "SecureP@ssw0rd1"}),
    )
    .await;
    let pair: TokenPair = serde_json::from_value(body).unwrap();
    let token = pair.access.as_str();

    let (status, product) = json_request(
        &router,
        "POST",
        "/api/products/",
        Some(token),
        serde_json::json!({
            "name": "Bag of beans",
            "description": "90kg",
            "price": "4500.00",
            "stock_quantity": 12,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_str().unwrap().to_string();

    let (status, listing) = json_request(
        &router,
        "GET",
        "/api/products/",
        Some(token),
        serde_json::Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);

    // cart accumulates quantities for the same product
    for _ in 0..2 {
        let (status, _) = json_request(
            &router,
            "POST",
            "/api/cart/",
            Some(token),
            serde_json::json!({"product_id": product_id, "quantity": 2}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, cart) = json_request(
        &router,
        "GET",
        "/api/cart/",
        Some(token),
        serde_json::Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 4);

    let (status, order) = json_request(
        &router,
        "POST",
        "/api/orders/",
        Some(token),
        serde_json::json!({
            "products": [{
                "product_id": product_id,
                "quantity": 2,
                "price_at_time_of_order": "4500.00",
            }],
            "total_price": "9000.00",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_price"], "9000.00");
}
