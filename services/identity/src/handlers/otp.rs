use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::error::IdentityServiceError;
use crate::handlers::{UserResponse, parse_purpose};
use crate::state::AppState;
use crate::usecase::otp::{
    RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

// ── POST /auth/issue-otp ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IssueOtpRequest {
    #[serde(default)]
    pub email: String,
    pub purpose: Option<String>,
}

#[derive(Serialize)]
pub struct IssueOtpResponse {
    pub ok: bool,
    pub message: &'static str,
}

pub async fn issue_otp(
    State(state): State<AppState>,
    Json(body): Json<IssueOtpRequest>,
) -> Result<impl IntoResponse, IdentityServiceError> {
    let purpose = parse_purpose(body.purpose.as_deref())?;
    let usecase = RequestOtpUseCase {
        engine: state.otp_engine(),
        credentials: state.credential_repo(),
        mailer: state.mailer.clone(),
    };
    usecase
        .execute(RequestOtpInput {
            email: body.email,
            purpose,
        })
        .await?;

    let body = IssueOtpResponse {
        ok: true,
        message: "verification code sent",
    };
    Ok((StatusCode::CREATED, Json(body)))
}

// ── POST /auth/verify-otp ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
    pub purpose: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, IdentityServiceError> {
    let purpose = parse_purpose(body.purpose.as_deref())?;
    let usecase = VerifyOtpUseCase {
        engine: state.otp_engine(),
        credentials: state.credential_manager(),
    };
    let user = usecase
        .execute(VerifyOtpInput {
            email: body.email,
            code: body.code,
            purpose,
            full_name: body.name,
            password: body.password,
        })
        .await?;

    Ok(Json(VerifyOtpResponse {
        ok: true,
        user: user.map(UserResponse::from),
    }))
}
