//! Session JWTs: HS256, `{sub, email, exp}`.
//!
//! Every service can validate a session. Only the identity service, built
//! with the `USE_ONLY_IN_IDENTITY_SERVICE` feature, can sign one.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_IDENTITY_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

/// Session lifetime in seconds (7 days). Also the cookie Max-Age.
pub const SESSION_TOKEN_EXP: u64 = 604800;

/// Learner identity carried by a valid session token.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub email: String,
    pub expires_at: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// Wire claims. `sub` is the user id, `exp` is seconds since the epoch.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_IDENTITY_SERVICE", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub exp: u64,
}

/// Sign a session for `user_id` that expires [`SESSION_TOKEN_EXP`] seconds
/// after `now` (epoch seconds). Returns the token and its expiry.
#[cfg(any(feature = "USE_ONLY_IN_IDENTITY_SERVICE", test))]
pub fn sign_session_token(
    user_id: Uuid,
    email: &str,
    now: u64,
    secret: &str,
) -> Result<(String, u64), jsonwebtoken::errors::Error> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let exp = now + SESSION_TOKEN_EXP;
    let claims = JwtClaims {
        sub: user_id.to_string(),
        email: email.to_owned(),
        exp,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, exp))
}

/// Check signature and expiry (60s leeway) and parse the subject.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionInfo, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?
    .claims;

    let user_id = claims.sub.parse().map_err(|_| AuthError::Malformed)?;
    Ok(SessionInfo {
        user_id,
        email: claims.email,
        expires_at: claims.exp,
    })
}
