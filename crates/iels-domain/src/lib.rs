//! Domain types shared across IELS services.
//!
//! Pure types with no framework dependencies.

pub mod email;
pub mod id;
pub mod otp;
