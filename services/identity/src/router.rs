use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use iels_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    health::{healthz, readyz},
    otp::{issue_otp, verify_otp},
    password::reset_password,
    session::{current_session, sign_in, sign_out},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // One-time codes
        .route("/auth/issue-otp", post(issue_otp))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/reset-password", post(reset_password))
        // Session
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/session", get(current_session))
        .route("/auth/sign-out", post(sign_out))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer()),
        )
}
