use sea_orm::DatabaseConnection;

use crate::infra::db::{DbCredentialRepository, DbOtpRepository};
use crate::infra::mailer::AppMailer;
use crate::usecase::code::CodeHasher;
use crate::usecase::credential::CredentialManager;
use crate::usecase::otp::OtpEngine;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: AppMailer,
    pub hasher: CodeHasher,
    pub jwt_secret: String,
    pub cookie_domain: String,
}

impl AppState {
    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }

    pub fn credential_repo(&self) -> DbCredentialRepository {
        DbCredentialRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_engine(&self) -> OtpEngine<DbOtpRepository> {
        OtpEngine {
            otps: self.otp_repo(),
            hasher: self.hasher.clone(),
        }
    }

    pub fn credential_manager(&self) -> CredentialManager<DbCredentialRepository> {
        CredentialManager {
            credentials: self.credential_repo(),
        }
    }
}
