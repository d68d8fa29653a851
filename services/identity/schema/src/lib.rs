//! sea-orm entities owned by the identity service.

pub mod otp_records;
pub mod user_credentials;
