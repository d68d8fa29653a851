use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use iels_domain::email::Email;
use iels_domain::id::OtpRecordId;
use iels_domain::otp::OtpPurpose;
use iels_identity_schema::{otp_records, user_credentials};

use crate::domain::repository::{CredentialRepository, OtpRepository};
use crate::domain::types::{MAX_FAILED_ATTEMPTS, OtpRecord, UserCredential};
use crate::error::IdentityServiceError;

// ── OtpRecord repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

fn eligible(
    email: &Email,
    purpose: OtpPurpose,
    now: DateTime<Utc>,
) -> sea_orm::Select<otp_records::Entity> {
    otp_records::Entity::find()
        .filter(otp_records::Column::Email.eq(email.as_str()))
        .filter(otp_records::Column::Purpose.eq(purpose.as_str()))
        .filter(otp_records::Column::Used.eq(false))
        .filter(otp_records::Column::ExpiresAt.gt(now))
        .filter(otp_records::Column::FailedAttempts.lt(MAX_FAILED_ATTEMPTS))
}

impl OtpRepository for DbOtpRepository {
    async fn count_active(
        &self,
        email: &Email,
        purpose: OtpPurpose,
    ) -> Result<u64, IdentityServiceError> {
        let count = eligible(email, purpose, Utc::now())
            .count(&self.db)
            .await
            .context("count active otp records")?;
        Ok(count)
    }

    async fn create(&self, record: &OtpRecord) -> Result<(), IdentityServiceError> {
        otp_records::ActiveModel {
            id: Set(record.id.0),
            email: Set(record.email.to_string()),
            code_hash: Set(record.code_hash.clone()),
            purpose: Set(record.purpose.as_str().to_owned()),
            expires_at: Set(record.expires_at),
            used: Set(record.used),
            failed_attempts: Set(record.failed_attempts),
            created_at: Set(record.created_at),
        }
        .insert(&self.db)
        .await
        .context("create otp record")?;
        Ok(())
    }

    async fn find_eligible(
        &self,
        email: &Email,
        purpose: OtpPurpose,
    ) -> Result<Vec<OtpRecord>, IdentityServiceError> {
        let models = eligible(email, purpose, Utc::now())
            .order_by_desc(otp_records::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("find eligible otp records")?;
        models.into_iter().map(otp_from_model).collect()
    }

    async fn record_failed_attempt(
        &self,
        ids: &[OtpRecordId],
    ) -> Result<(), IdentityServiceError> {
        if ids.is_empty() {
            return Ok(());
        }
        // Increment in SQL so concurrent failures are all counted.
        otp_records::Entity::update_many()
            .col_expr(
                otp_records::Column::FailedAttempts,
                Expr::col(otp_records::Column::FailedAttempts).add(1),
            )
            .filter(otp_records::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .exec(&self.db)
            .await
            .context("record failed otp attempt")?;
        Ok(())
    }

    async fn consume(&self, id: OtpRecordId) -> Result<bool, IdentityServiceError> {
        let result = otp_records::Entity::update_many()
            .col_expr(otp_records::Column::Used, Expr::value(true))
            .filter(otp_records::Column::Id.eq(id.0))
            .filter(otp_records::Column::Used.eq(false))
            .exec(&self.db)
            .await
            .context("consume otp record")?;
        Ok(result.rows_affected == 1)
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, IdentityServiceError> {
        let result = otp_records::Entity::delete_many()
            .filter(otp_records::Column::ExpiresAt.lt(before))
            .exec(&self.db)
            .await
            .context("purge expired otp records")?;
        Ok(result.rows_affected)
    }
}

fn otp_from_model(model: otp_records::Model) -> Result<OtpRecord, IdentityServiceError> {
    let email = Email::parse(&model.email).context("stored otp email is malformed")?;
    let purpose = model
        .purpose
        .parse::<OtpPurpose>()
        .context("stored otp purpose is unknown")?;
    Ok(OtpRecord {
        id: model.id.into(),
        email,
        code_hash: model.code_hash,
        purpose,
        expires_at: model.expires_at,
        used: model.used,
        failed_attempts: model.failed_attempts,
        created_at: model.created_at,
    })
}

// ── UserCredential repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCredentialRepository {
    pub db: DatabaseConnection,
}

impl CredentialRepository for DbCredentialRepository {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredential>, IdentityServiceError> {
        let model = user_credentials::Entity::find()
            .filter(user_credentials::Column::Email.eq(email.as_str()))
            .one(&self.db)
            .await
            .context("find credential by email")?;
        model.map(credential_from_model).transpose()
    }

    async fn create_if_absent(
        &self,
        credential: &UserCredential,
    ) -> Result<UserCredential, IdentityServiceError> {
        let active = user_credentials::ActiveModel {
            id: Set(credential.id.0),
            email: Set(credential.email.to_string()),
            password_hash: Set(credential.password_hash.clone()),
            full_name: Set(credential.full_name.clone()),
            created_at: Set(credential.created_at),
            updated_at: Set(credential.updated_at),
        };
        user_credentials::Entity::insert(active)
            .on_conflict(
                OnConflict::column(user_credentials::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert credential")?;

        self.find_by_email(&credential.email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("credential missing after insert").into())
    }

    async fn update_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<bool, IdentityServiceError> {
        let result = user_credentials::Entity::update_many()
            .col_expr(
                user_credentials::Column::PasswordHash,
                Expr::value(password_hash.to_owned()),
            )
            .col_expr(user_credentials::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user_credentials::Column::Email.eq(email.as_str()))
            .exec(&self.db)
            .await
            .context("update credential password")?;
        Ok(result.rows_affected > 0)
    }
}

fn credential_from_model(
    model: user_credentials::Model,
) -> Result<UserCredential, IdentityServiceError> {
    let email = Email::parse(&model.email).context("stored credential email is malformed")?;
    Ok(UserCredential {
        id: model.id.into(),
        email,
        password_hash: model.password_hash,
        full_name: model.full_name,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
