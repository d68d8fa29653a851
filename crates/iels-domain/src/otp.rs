//! One-time code domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The flow that issued a one-time code.
///
/// Wire format: `"signup"` or `"forgot"`; `"reset"` is accepted as an alias
/// for `"forgot"`. A code only ever verifies within its own purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Signup,
    #[serde(alias = "reset")]
    Forgot,
}

impl OtpPurpose {
    /// Stored column value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Forgot => "forgot",
        }
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or submitted purpose tag is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown otp purpose: {0}")]
pub struct UnknownPurpose(pub String);

impl FromStr for OtpPurpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(Self::Signup),
            "forgot" | "reset" => Ok(Self::Forgot),
            other => Err(UnknownPurpose(other.to_owned())),
        }
    }
}
