use std::time::{SystemTime, UNIX_EPOCH};

use iels_auth_types::token::sign_session_token;
use iels_domain::email::Email;

use crate::domain::repository::CredentialRepository;
use crate::domain::types::UserCredential;
use crate::error::IdentityServiceError;
use crate::usecase::credential::CredentialManager;

fn now_secs() -> Result<u64, IdentityServiceError> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("system clock before UNIX epoch: {e}"))?;
    Ok(elapsed.as_secs())
}

/// Sign a session token for `user`. Returns the token and its expiry (epoch seconds).
pub fn issue_session_token(
    user: &UserCredential,
    secret: &str,
) -> Result<(String, u64), IdentityServiceError> {
    let (token, exp) = sign_session_token(user.id.0, user.email.as_str(), now_secs()?, secret)
        .map_err(|e| anyhow::anyhow!("sign session token: {e}"))?;
    Ok((token, exp))
}

// ── SignIn ────────────────────────────────────────────────────────────────────

pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct SignInOutput {
    pub user: UserCredential,
    pub token: String,
    pub expires_at: u64,
}

pub struct SignInUseCase<C: CredentialRepository> {
    pub credentials: CredentialManager<C>,
    pub jwt_secret: String,
}

impl<C: CredentialRepository> SignInUseCase<C> {
    pub async fn execute(&self, input: SignInInput) -> Result<SignInOutput, IdentityServiceError> {
        let email = Email::parse(&input.email)?;
        if input.password.is_empty() {
            return Err(IdentityServiceError::MissingData);
        }

        let user = self
            .credentials
            .authenticate(&email, &input.password)
            .await?;
        let (token, expires_at) = issue_session_token(&user, &self.jwt_secret)?;

        tracing::info!(user_id = %user.id, "signed in");
        Ok(SignInOutput {
            user,
            token,
            expires_at,
        })
    }
}
