use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use iels_identity::infra::mailer::{AppMailer, LogMailer};
use iels_identity::router::build_router;
use iels_identity::state::AppState;
use iels_identity::usecase::token::issue_session_token;

use crate::helpers::{TEST_JWT_SECRET, test_hasher, test_user};

// Every request below is rejected or answered before the database is touched.
fn test_server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        mailer: AppMailer::Log(LogMailer),
        hasher: test_hasher(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        cookie_domain: "iels.test".to_owned(),
    };
    TestServer::new(build_router(state)).unwrap()
}

fn assert_error_kind(response: axum_test::TestResponse, status: StatusCode, kind: &str) {
    assert_eq!(response.status_code(), status);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["kind"], kind);
}

#[tokio::test]
async fn should_answer_liveness_with_request_id() {
    let server = test_server();

    let response = server.get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let server = test_server();
    let response = server.get("/readyz").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let server = test_server();
    let response = server
        .post("/auth/issue-otp")
        .json(&json!({ "email": "nope", "purpose": "signup" }))
        .await;
    assert_error_kind(response, StatusCode::BAD_REQUEST, "INVALID_EMAIL");
}

#[tokio::test]
async fn should_reject_missing_or_unknown_purpose() {
    let server = test_server();

    let response = server
        .post("/auth/issue-otp")
        .json(&json!({ "email": "learner@example.com" }))
        .await;
    assert_error_kind(response, StatusCode::BAD_REQUEST, "MISSING_DATA");

    let response = server
        .post("/auth/verify-otp")
        .json(&json!({ "email": "learner@example.com", "code": "123456", "purpose": "login" }))
        .await;
    assert_error_kind(response, StatusCode::BAD_REQUEST, "INVALID_PURPOSE");
}

#[tokio::test]
async fn should_reject_verification_without_code() {
    let server = test_server();
    let response = server
        .post("/auth/verify-otp")
        .json(&json!({ "email": "learner@example.com", "purpose": "signup" }))
        .await;
    assert_error_kind(response, StatusCode::BAD_REQUEST, "MISSING_DATA");
}

#[tokio::test]
async fn should_reject_short_password_before_verification() {
    let server = test_server();
    let response = server
        .post("/auth/reset-password")
        .json(&json!({ "email": "learner@example.com", "code": "123456", "password": "short" }))
        .await;
    assert_error_kind(response, StatusCode::BAD_REQUEST, "INVALID_PASSWORD");
}

#[tokio::test]
async fn should_require_password_on_sign_in() {
    let server = test_server();
    let response = server
        .post("/auth/sign-in")
        .json(&json!({ "email": "learner@example.com" }))
        .await;
    assert_error_kind(response, StatusCode::BAD_REQUEST, "MISSING_DATA");
}

#[tokio::test]
async fn should_reject_session_without_cookie() {
    let server = test_server();
    let response = server.get("/auth/session").await;
    assert_error_kind(response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN");
}

#[tokio::test]
async fn should_return_session_for_valid_cookie() {
    let server = test_server();
    let user = test_user("learner@example.com", None);
    let (token, exp) = issue_session_token(&user, TEST_JWT_SECRET).unwrap();

    let response = server
        .get("/auth/session")
        .add_header(
            header::COOKIE,
            HeaderValue::from_str(&format!("iels_session={token}")).unwrap(),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["user_id"], user.id.to_string());
    assert_eq!(body["email"], "learner@example.com");
    assert_eq!(body["expires_at"], exp);
}

#[tokio::test]
async fn should_reject_session_with_tampered_cookie() {
    let server = test_server();
    let response = server
        .get("/auth/session")
        .add_header(
            header::COOKIE,
            HeaderValue::from_static("iels_session=not.a.jwt"),
        )
        .await;
    assert_error_kind(response, StatusCode::UNAUTHORIZED, "INVALID_TOKEN");
}

#[tokio::test]
async fn should_clear_cookie_on_sign_out() {
    let server = test_server();
    let response = server.post("/auth/sign-out").await;

    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(set_cookie.starts_with("iels_session="));
    assert!(set_cookie.contains("Max-Age=0"));
}
