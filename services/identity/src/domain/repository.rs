#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use iels_domain::email::Email;
use iels_domain::id::OtpRecordId;
use iels_domain::otp::OtpPurpose;

use crate::domain::types::{OtpRecord, UserCredential};
use crate::error::{DeliveryError, IdentityServiceError};

/// Repository for issued one-time codes.
pub trait OtpRepository: Send + Sync {
    /// Count eligible (unused and unexpired) codes for an email + purpose.
    async fn count_active(
        &self,
        email: &Email,
        purpose: OtpPurpose,
    ) -> Result<u64, IdentityServiceError>;

    async fn create(&self, record: &OtpRecord) -> Result<(), IdentityServiceError>;

    /// Eligible codes for an email + purpose, newest first.
    async fn find_eligible(
        &self,
        email: &Email,
        purpose: OtpPurpose,
    ) -> Result<Vec<OtpRecord>, IdentityServiceError>;

    /// Add one failed guess to each listed record.
    async fn record_failed_attempt(
        &self,
        ids: &[OtpRecordId],
    ) -> Result<(), IdentityServiceError>;

    /// Atomically flip `used` from false to true.
    /// Returns `false` when the record was already consumed.
    async fn consume(&self, id: OtpRecordId) -> Result<bool, IdentityServiceError>;

    /// Delete records that expired before `before`. Returns the number removed.
    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, IdentityServiceError>;
}

/// Repository for learner credentials.
pub trait CredentialRepository: Send + Sync {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredential>, IdentityServiceError>;

    /// Insert unless a credential with the same email exists.
    /// Returns the stored row in both cases.
    async fn create_if_absent(
        &self,
        credential: &UserCredential,
    ) -> Result<UserCredential, IdentityServiceError>;

    /// Overwrite the password hash. Returns `false` when no credential matches.
    async fn update_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<bool, IdentityServiceError>;
}

/// Out-of-band delivery of codes.
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), DeliveryError>;
}
