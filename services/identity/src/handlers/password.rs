use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::IdentityServiceError;
use crate::state::AppState;
use crate::usecase::credential::{ResetPasswordInput, ResetPasswordUseCase};

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct ResetPasswordResponse {
    pub ok: bool,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, IdentityServiceError> {
    let usecase = ResetPasswordUseCase {
        engine: state.otp_engine(),
        credentials: state.credential_manager(),
    };
    usecase
        .execute(ResetPasswordInput {
            email: body.email,
            code: body.code,
            password: body.password,
        })
        .await?;
    Ok(Json(ResetPasswordResponse { ok: true }))
}
