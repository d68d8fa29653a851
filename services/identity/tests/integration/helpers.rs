use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use iels_domain::email::Email;
use iels_domain::id::{OtpRecordId, UserId};
use iels_domain::otp::OtpPurpose;
use iels_identity::domain::repository::{CredentialRepository, Mailer, OtpRepository};
use iels_identity::domain::types::{OtpRecord, UserCredential};
use iels_identity::error::{DeliveryError, IdentityServiceError};
use iels_identity::usecase::code::CodeHasher;
use iels_identity::usecase::credential::CredentialManager;
use iels_identity::usecase::otp::OtpEngine;
use iels_identity::usecase::password::hash_password;

pub const TEST_OTP_SECRET: &str = "test-otp-secret";
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

// ── MockOtpRepo ──────────────────────────────────────────────────────────────

/// In-memory code store. Clones share the same records.
#[derive(Clone, Default)]
pub struct MockOtpRepo {
    pub records: Arc<Mutex<Vec<OtpRecord>>>,
}

impl MockOtpRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a shared handle to the internal record list for post-execution inspection.
    pub fn records_handle(&self) -> Arc<Mutex<Vec<OtpRecord>>> {
        Arc::clone(&self.records)
    }
}

impl OtpRepository for MockOtpRepo {
    async fn count_active(
        &self,
        email: &Email,
        purpose: OtpPurpose,
    ) -> Result<u64, IdentityServiceError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.email == email && r.purpose == purpose && r.is_eligible())
            .count() as u64)
    }

    async fn create(&self, record: &OtpRecord) -> Result<(), IdentityServiceError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_eligible(
        &self,
        email: &Email,
        purpose: OtpPurpose,
    ) -> Result<Vec<OtpRecord>, IdentityServiceError> {
        let mut found: Vec<OtpRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.email == email && r.purpose == purpose && r.is_eligible())
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        // Hand control back so concurrent verifications can read the same snapshot.
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn record_failed_attempt(
        &self,
        ids: &[OtpRecordId],
    ) -> Result<(), IdentityServiceError> {
        let mut records = self.records.lock().unwrap();
        for r in records.iter_mut().filter(|r| ids.contains(&r.id)) {
            r.failed_attempts += 1;
        }
        Ok(())
    }

    async fn consume(&self, id: OtpRecordId) -> Result<bool, IdentityServiceError> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == id && !r.used) {
            Some(r) => {
                r.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, IdentityServiceError> {
        let mut records = self.records.lock().unwrap();
        let len = records.len();
        records.retain(|r| r.expires_at >= before);
        Ok((len - records.len()) as u64)
    }
}

// ── MockCredentialRepo ───────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCredentialRepo {
    pub credentials: Arc<Mutex<Vec<UserCredential>>>,
}

impl MockCredentialRepo {
    pub fn new(credentials: Vec<UserCredential>) -> Self {
        Self {
            credentials: Arc::new(Mutex::new(credentials)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn credentials_handle(&self) -> Arc<Mutex<Vec<UserCredential>>> {
        Arc::clone(&self.credentials)
    }
}

impl CredentialRepository for MockCredentialRepo {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredential>, IdentityServiceError> {
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.email == email)
            .cloned())
    }

    async fn create_if_absent(
        &self,
        credential: &UserCredential,
    ) -> Result<UserCredential, IdentityServiceError> {
        let mut credentials = self.credentials.lock().unwrap();
        if let Some(existing) = credentials.iter().find(|c| c.email == credential.email) {
            return Ok(existing.clone());
        }
        credentials.push(credential.clone());
        Ok(credential.clone())
    }

    async fn update_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<bool, IdentityServiceError> {
        let mut credentials = self.credentials.lock().unwrap();
        match credentials.iter_mut().find(|c| &c.email == email) {
            Some(c) => {
                c.password_hash = Some(password_hash.to_owned());
                c.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: Email,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<SentMail>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<SentMail>>> {
        Arc::clone(&self.sent)
    }
}

impl Mailer for MockMailer {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Transport("connection refused".to_owned()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.clone(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        });
        Ok(())
    }
}

/// Pull the six-digit code out of a delivered message body.
pub fn extract_code(body: &str) -> String {
    body.split(|c: char| !c.is_ascii_digit())
        .find(|part| part.len() == 6)
        .expect("message body should contain a six-digit code")
        .to_owned()
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

pub fn test_hasher() -> CodeHasher {
    CodeHasher::new(TEST_OTP_SECRET).unwrap()
}

pub fn engine(otps: MockOtpRepo) -> OtpEngine<MockOtpRepo> {
    OtpEngine {
        otps,
        hasher: test_hasher(),
    }
}

pub fn manager(credentials: MockCredentialRepo) -> CredentialManager<MockCredentialRepo> {
    CredentialManager { credentials }
}

/// Stored credential, with an argon2 hash when `password` is given.
pub fn test_user(raw_email: &str, password: Option<&str>) -> UserCredential {
    let now = Utc::now();
    UserCredential {
        id: UserId::new(),
        email: email(raw_email),
        password_hash: password.map(|p| hash_password(p).unwrap()),
        full_name: Some("Test Learner".to_owned()),
        created_at: now,
        updated_at: now,
    }
}
