use std::num::NonZeroU64;

use serde::Deserialize;

use iels_core::config::Config;

/// Identity service configuration loaded from environment variables
/// (field `database_url` reads `DATABASE_URL`, and so on).
#[derive(Deserialize)]
pub struct IdentityConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// HMAC key for one-time code hashes. Rotating it invalidates outstanding codes.
    pub otp_secret: String,
    /// Cookie domain attribute (root domain, e.g. "iels.example").
    pub cookie_domain: String,
    /// TCP port to listen on (default 3112). Env var: `IDENTITY_PORT`.
    #[serde(default = "default_identity_port")]
    pub identity_port: u16,
    /// Sender mailbox for code emails.
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
    /// SMTP relay host. Codes are only logged when unset.
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// How long expired codes are kept before the purge task deletes them.
    #[serde(default = "default_otp_retention_hours")]
    pub otp_retention_hours: u32,
    /// Seconds between purge runs. Zero is rejected at load time.
    #[serde(default = "default_otp_purge_interval_secs")]
    pub otp_purge_interval_secs: NonZeroU64,
}

impl Config for IdentityConfig {}

fn default_identity_port() -> u16 {
    3112
}

fn default_mail_from() -> String {
    "IELS <no-reply@iels.local>".to_owned()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_otp_retention_hours() -> u32 {
    24
}

fn default_otp_purge_interval_secs() -> NonZeroU64 {
    NonZeroU64::MIN.saturating_add(3599)
}
