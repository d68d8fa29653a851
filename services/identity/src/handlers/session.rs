use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use iels_auth_types::{
    cookie::{IELS_SESSION, clear_session_cookie, set_session_cookie},
    token::validate_session_token,
};

use crate::error::IdentityServiceError;
use crate::handlers::UserResponse;
use crate::state::AppState;
use crate::usecase::token::{SignInInput, SignInUseCase};

// ── POST /auth/sign-in ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub ok: bool,
    pub token: String,
    pub user: UserResponse,
    pub expires_at: u64,
}

pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignInRequest>,
) -> Result<impl IntoResponse, IdentityServiceError> {
    let usecase = SignInUseCase {
        credentials: state.credential_manager(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(SignInInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookie(jar, out.token.clone(), state.cookie_domain.clone());
    let body = SignInResponse {
        ok: true,
        token: out.token,
        user: out.user.into(),
        expires_at: out.expires_at,
    };
    Ok((StatusCode::OK, jar, Json(body)))
}

// ── GET /auth/session ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionResponse {
    pub ok: bool,
    pub user_id: uuid::Uuid,
    pub email: String,
    pub expires_at: u64,
}

pub async fn current_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>, IdentityServiceError> {
    let token_value = jar
        .get(IELS_SESSION)
        .map(|c| c.value().to_owned())
        .ok_or(IdentityServiceError::InvalidToken)?;

    let info = validate_session_token(&token_value, &state.jwt_secret)
        .map_err(|_| IdentityServiceError::InvalidToken)?;

    Ok(Json(SessionResponse {
        ok: true,
        user_id: info.user_id,
        email: info.email,
        expires_at: info.expires_at,
    }))
}

// ── POST /auth/sign-out ───────────────────────────────────────────────────────

pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_session_cookie(jar, state.cookie_domain.clone());
    (StatusCode::NO_CONTENT, jar)
}
