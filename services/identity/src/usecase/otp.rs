use chrono::{Duration, Utc};

use iels_domain::email::Email;
use iels_domain::id::OtpRecordId;
use iels_domain::otp::OtpPurpose;

use crate::domain::repository::{CredentialRepository, Mailer, OtpRepository};
use crate::domain::types::{
    MAX_ACTIVE_CODES, OTP_CODE_LEN, OTP_TTL_SECS, OtpRecord, UserCredential, VerifiedIdentity,
};
use crate::error::IdentityServiceError;
use crate::usecase::code::{CodeHasher, generate_code};
use crate::usecase::credential::CredentialManager;
use crate::usecase::password::validate_password;

// ── OtpEngine ─────────────────────────────────────────────────────────────────

/// Issues and verifies one-time codes for an (email, purpose) pair.
pub struct OtpEngine<O: OtpRepository> {
    pub otps: O,
    pub hasher: CodeHasher,
}

impl<O: OtpRepository> OtpEngine<O> {
    /// Store a new code and return its plaintext for out-of-band delivery.
    ///
    /// Earlier outstanding codes for the same pair stay valid until their own
    /// expiry; at most [`MAX_ACTIVE_CODES`] may be outstanding at once.
    pub async fn issue(
        &self,
        email: &Email,
        purpose: OtpPurpose,
    ) -> Result<String, IdentityServiceError> {
        let active = self.otps.count_active(email, purpose).await?;
        if active >= MAX_ACTIVE_CODES {
            return Err(IdentityServiceError::TooManyCodes);
        }

        let code = generate_code(OTP_CODE_LEN);
        let now = Utc::now();
        let record = OtpRecord {
            id: OtpRecordId::new(),
            email: email.clone(),
            code_hash: self.hasher.hash(email, purpose, &code),
            purpose,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            used: false,
            failed_attempts: 0,
            created_at: now,
        };
        self.otps.create(&record).await?;

        tracing::info!(otp_id = %record.id, %purpose, "otp issued");
        Ok(code)
    }

    /// Check `code` against the eligible records for the pair, newest first,
    /// and consume the one it matches.
    ///
    /// A mismatch consumes nothing, so the caller may retry within the window,
    /// but it counts against every candidate; a code stops verifying after
    /// [`MAX_FAILED_ATTEMPTS`](crate::domain::types::MAX_FAILED_ATTEMPTS) failed guesses.
    pub async fn verify(
        &self,
        email: &Email,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<VerifiedIdentity, IdentityServiceError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(IdentityServiceError::MissingData);
        }

        let candidates = self.otps.find_eligible(email, purpose).await?;
        if candidates.is_empty() {
            return Err(IdentityServiceError::NoValidCode);
        }

        let Some(record) = candidates
            .iter()
            .find(|r| self.hasher.matches(email, purpose, code, &r.code_hash))
        else {
            // The guess was checked against every candidate, so each one pays.
            let ids: Vec<OtpRecordId> = candidates.iter().map(|r| r.id).collect();
            self.otps.record_failed_attempt(&ids).await?;
            return Err(IdentityServiceError::InvalidCode);
        };

        // Conditional update: exactly one concurrent caller flips `used`.
        if !self.otps.consume(record.id).await? {
            tracing::info!(otp_id = %record.id, %purpose, "otp consumed concurrently");
            return Err(IdentityServiceError::AlreadyConsumed);
        }

        tracing::info!(otp_id = %record.id, %purpose, "otp verified");
        Ok(VerifiedIdentity {
            email: email.clone(),
            purpose,
        })
    }
}

fn compose_message(purpose: OtpPurpose, code: &str) -> (&'static str, String) {
    let minutes = OTP_TTL_SECS / 60;
    match purpose {
        OtpPurpose::Signup => (
            "Your IELS verification code",
            format!(
                "Welcome to IELS!\n\n\
                 Your verification code is: {code}\n\n\
                 This code will expire in {minutes} minutes.\n\n\
                 If you didn't request this code, please ignore this email."
            ),
        ),
        OtpPurpose::Forgot => (
            "Reset your IELS password",
            format!(
                "We received a request to reset your IELS password.\n\n\
                 Your reset code is: {code}\n\n\
                 This code will expire in {minutes} minutes.\n\n\
                 If you didn't request a reset, you can safely ignore this email."
            ),
        ),
    }
}

// ── RequestOtp ────────────────────────────────────────────────────────────────

pub struct RequestOtpInput {
    pub email: String,
    pub purpose: OtpPurpose,
}

pub struct RequestOtpUseCase<O, C, M>
where
    O: OtpRepository,
    C: CredentialRepository,
    M: Mailer,
{
    pub engine: OtpEngine<O>,
    pub credentials: C,
    pub mailer: M,
}

impl<O, C, M> RequestOtpUseCase<O, C, M>
where
    O: OtpRepository,
    C: CredentialRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: RequestOtpInput) -> Result<(), IdentityServiceError> {
        let email = Email::parse(&input.email)?;

        // 1. Purpose preconditions: signup needs a fresh email, reset a known one.
        let existing = self.credentials.find_by_email(&email).await?;
        match (input.purpose, existing) {
            (OtpPurpose::Signup, Some(_)) => return Err(IdentityServiceError::UserAlreadyExists),
            (OtpPurpose::Forgot, None) => return Err(IdentityServiceError::UserNotFound),
            _ => {}
        }

        // 2. Persist the record.
        let code = self.engine.issue(&email, input.purpose).await?;

        // 3. Deliver. The record stays valid even if sending fails.
        let (subject, body) = compose_message(input.purpose, &code);
        if let Err(e) = self.mailer.send(&email, subject, &body).await {
            tracing::warn!(error = %e, purpose = %input.purpose, "otp delivery failed");
        }
        Ok(())
    }
}

// ── VerifyOtp ─────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub email: String,
    pub code: String,
    pub purpose: OtpPurpose,
    pub full_name: Option<String>,
    pub password: Option<String>,
}

/// Verifies a code and completes the flow it belongs to: `signup` creates
/// (or returns) the credential, `forgot` with a password resets it.
pub struct VerifyOtpUseCase<O: OtpRepository, C: CredentialRepository> {
    pub engine: OtpEngine<O>,
    pub credentials: CredentialManager<C>,
}

impl<O: OtpRepository, C: CredentialRepository> VerifyOtpUseCase<O, C> {
    pub async fn execute(
        &self,
        input: VerifyOtpInput,
    ) -> Result<Option<UserCredential>, IdentityServiceError> {
        let email = Email::parse(&input.email)?;
        // Reject a bad password before the code is spent.
        if let Some(password) = input.password.as_deref() {
            validate_password(password)?;
        }

        let verified = self
            .engine
            .verify(&email, input.purpose, &input.code)
            .await?;

        match input.purpose {
            OtpPurpose::Signup => {
                let user = self
                    .credentials
                    .complete_signup(&verified, input.full_name, input.password)
                    .await?;
                Ok(Some(user))
            }
            OtpPurpose::Forgot => {
                if let Some(password) = input.password {
                    self.credentials.reset_password(&verified, password).await?;
                }
                Ok(None)
            }
        }
    }
}
