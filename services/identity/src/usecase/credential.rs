use chrono::Utc;

use iels_domain::email::Email;
use iels_domain::id::UserId;
use iels_domain::otp::OtpPurpose;

use crate::domain::repository::{CredentialRepository, OtpRepository};
use crate::domain::types::{UserCredential, VerifiedIdentity};
use crate::error::IdentityServiceError;
use crate::usecase::otp::OtpEngine;
use crate::usecase::password::{
    hash_password_blocking, validate_password, verify_password_blocking,
};

fn require_purpose(
    verified: &VerifiedIdentity,
    purpose: OtpPurpose,
) -> Result<(), IdentityServiceError> {
    if verified.purpose != purpose {
        return Err(anyhow::anyhow!(
            "{} verification cannot complete a {} flow",
            verified.purpose,
            purpose
        )
        .into());
    }
    Ok(())
}

// ── CredentialManager ─────────────────────────────────────────────────────────

/// Creates, updates and checks learner credentials.
///
/// Mutations take a [`VerifiedIdentity`], so they can only follow a
/// successful code verification for the matching purpose.
pub struct CredentialManager<C: CredentialRepository> {
    pub credentials: C,
}

impl<C: CredentialRepository> CredentialManager<C> {
    /// Idempotent: an existing credential for the email is returned unchanged.
    pub async fn complete_signup(
        &self,
        verified: &VerifiedIdentity,
        full_name: Option<String>,
        password: Option<String>,
    ) -> Result<UserCredential, IdentityServiceError> {
        require_purpose(verified, OtpPurpose::Signup)?;

        if let Some(existing) = self.credentials.find_by_email(&verified.email).await? {
            return Ok(existing);
        }

        let password_hash = match password {
            Some(password) => {
                validate_password(&password)?;
                Some(hash_password_blocking(password).await?)
            }
            None => None,
        };
        let full_name = full_name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());

        let now = Utc::now();
        let credential = UserCredential {
            id: UserId::new(),
            email: verified.email.clone(),
            password_hash,
            full_name,
            created_at: now,
            updated_at: now,
        };
        // A concurrent signup for the same email may have inserted first;
        // the repository returns whichever row won.
        let stored = self.credentials.create_if_absent(&credential).await?;
        if stored.id == credential.id {
            tracing::info!(user_id = %stored.id, "credential created");
        }
        Ok(stored)
    }

    pub async fn reset_password(
        &self,
        verified: &VerifiedIdentity,
        new_password: String,
    ) -> Result<(), IdentityServiceError> {
        require_purpose(verified, OtpPurpose::Forgot)?;
        validate_password(&new_password)?;

        let hash = hash_password_blocking(new_password).await?;
        if !self
            .credentials
            .update_password(&verified.email, &hash)
            .await?
        {
            return Err(IdentityServiceError::UserNotFound);
        }
        tracing::info!(purpose = %verified.purpose, "password reset");
        Ok(())
    }

    /// Unknown email, passwordless account and wrong password all return
    /// [`IdentityServiceError::InvalidCredentials`].
    pub async fn authenticate(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<UserCredential, IdentityServiceError> {
        let credential = self
            .credentials
            .find_by_email(email)
            .await?
            .ok_or(IdentityServiceError::InvalidCredentials)?;
        let hash = credential
            .password_hash
            .clone()
            .ok_or(IdentityServiceError::InvalidCredentials)?;

        match verify_password_blocking(password.to_owned(), hash).await {
            Ok(true) => Ok(credential),
            Ok(false) => Err(IdentityServiceError::InvalidCredentials),
            Err(e) => {
                tracing::error!(error = %e, user_id = %credential.id, "stored password hash is unreadable");
                Err(IdentityServiceError::InvalidCredentials)
            }
        }
    }
}

// ── ResetPassword ─────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub password: String,
}

/// Verifies a `forgot` code and overwrites the password in one request.
pub struct ResetPasswordUseCase<O: OtpRepository, C: CredentialRepository> {
    pub engine: OtpEngine<O>,
    pub credentials: CredentialManager<C>,
}

impl<O: OtpRepository, C: CredentialRepository> ResetPasswordUseCase<O, C> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), IdentityServiceError> {
        let email = Email::parse(&input.email)?;
        validate_password(&input.password)?;

        let verified = self
            .engine
            .verify(&email, OtpPurpose::Forgot, &input.code)
            .await?;
        self.credentials
            .reset_password(&verified, input.password)
            .await
    }
}
