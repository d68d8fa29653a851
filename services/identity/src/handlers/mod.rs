pub mod health;
pub mod otp;
pub mod password;
pub mod session;

use chrono::{DateTime, Utc};
use serde::Serialize;

use iels_core::serde::to_rfc3339_ms;
use iels_domain::otp::OtpPurpose;

use crate::domain::types::UserCredential;
use crate::error::IdentityServiceError;

/// Purpose arrives as free text so that a missing or unknown value maps to a
/// typed error instead of a JSON rejection.
pub(crate) fn parse_purpose(raw: Option<&str>) -> Result<OtpPurpose, IdentityServiceError> {
    let raw = raw.map(str::trim).filter(|p| !p.is_empty());
    let Some(raw) = raw else {
        return Err(IdentityServiceError::MissingData);
    };
    raw.parse().map_err(|_| IdentityServiceError::InvalidPurpose)
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<UserCredential> for UserResponse {
    fn from(user: UserCredential) -> Self {
        Self {
            id: user.id.0,
            email: user.email.to_string(),
            full_name: user.full_name,
            created_at: user.created_at,
        }
    }
}
