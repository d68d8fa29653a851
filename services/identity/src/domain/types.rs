use chrono::{DateTime, Utc};

use iels_domain::email::Email;
use iels_domain::id::{OtpRecordId, UserId};
use iels_domain::otp::OtpPurpose;

/// Issued one-time code. Only the keyed hash of the code is kept.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: OtpRecordId,
    pub email: Email,
    pub code_hash: String,
    pub purpose: OtpPurpose,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    /// Failed guesses checked against this record.
    pub failed_attempts: i32,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Unused, not yet expired at `now`, and still under the guess limit.
    pub fn is_eligible_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now && self.failed_attempts < MAX_FAILED_ATTEMPTS
    }

    pub fn is_eligible(&self) -> bool {
        self.is_eligible_at(Utc::now())
    }
}

/// Stored learner credential.
#[derive(Debug, Clone)]
pub struct UserCredential {
    pub id: UserId,
    pub email: Email,
    /// argon2id PHC string; `None` for accounts created without a password.
    pub password_hash: Option<String>,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Proof that the caller controls `email` for `purpose`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: Email,
    pub purpose: OtpPurpose,
}

/// Number of decimal digits in a one-time code.
pub const OTP_CODE_LEN: usize = 6;

/// One-time code time-to-live in seconds (10 minutes).
pub const OTP_TTL_SECS: i64 = 600;

/// Maximum number of eligible codes per (email, purpose).
pub const MAX_ACTIVE_CODES: u64 = 5;

/// Failed guesses after which a code stops verifying.
///
/// A guess is checked against every eligible code for the pair, so one
/// (email, purpose) admits at most `MAX_ACTIVE_CODES * MAX_FAILED_ATTEMPTS`
/// guesses across its live codes.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;
