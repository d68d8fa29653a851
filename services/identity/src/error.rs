use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Identity service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum IdentityServiceError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be between 8 and 128 characters")]
    InvalidPassword,
    #[error("missing data")]
    MissingData,
    #[error("unknown purpose")]
    InvalidPurpose,
    #[error("no valid code, request a new one")]
    NoValidCode,
    #[error("invalid code")]
    InvalidCode,
    #[error("code already used")]
    AlreadyConsumed,
    #[error("too many active codes")]
    TooManyCodes,
    #[error("user not found")]
    UserNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IdentityServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::MissingData => "MISSING_DATA",
            Self::InvalidPurpose => "INVALID_PURPOSE",
            Self::NoValidCode => "NO_VALID_CODE",
            Self::InvalidCode => "INVALID_CODE",
            Self::AlreadyConsumed => "CODE_ALREADY_CONSUMED",
            Self::TooManyCodes => "TOO_MANY_CODES",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEmail
            | Self::InvalidPassword
            | Self::MissingData
            | Self::InvalidPurpose => StatusCode::BAD_REQUEST,
            Self::NoValidCode
            | Self::InvalidCode
            | Self::InvalidCredentials
            | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::AlreadyConsumed | Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::TooManyCodes => StatusCode::TOO_MANY_REQUESTS,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<iels_domain::email::EmailError> for IdentityServiceError {
    fn from(_: iels_domain::email::EmailError) -> Self {
        Self::InvalidEmail
    }
}

impl IntoResponse for IdentityServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors and already visible through TraceLayer.
        // Internal errors need the anyhow chain logged; the body stays generic.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "ok": false,
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Failure reported by a [`Mailer`](crate::domain::repository::Mailer).
///
/// Never surfaced to HTTP callers: issuance logs it and still succeeds.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("failed to build message: {0}")]
    Message(String),
    #[error("transport failure: {0}")]
    Transport(String),
}
