use sea_orm::entity::prelude::*;

/// One-time code issued to an email for a given purpose (`signup` | `forgot`).
/// Only the keyed hash of the code is stored. Expires 10 minutes after issuance;
/// `used` flips to true exactly once. A code with five `failed_attempts`
/// no longer verifies.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub code_hash: String,
    pub purpose: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub used: bool,
    pub failed_attempts: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
