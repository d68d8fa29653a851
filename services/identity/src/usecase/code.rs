//! One-time code generation and keyed hashing.

use hmac::{Hmac, Mac};
use rand::RngExt;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use iels_domain::email::Email;
use iels_domain::otp::OtpPurpose;

type HmacSha256 = Hmac<Sha256>;

/// Generate `len` decimal digits from the thread-local CSPRNG.
/// Leading zeros are kept, so every code has exactly `len` characters.
pub fn generate_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// HMAC-SHA256 over `purpose \0 email \0 code`, keyed with the server secret.
///
/// Binding the email and purpose means a code hash is only meaningful for the
/// scope it was issued in; the key defeats offline precomputation.
#[derive(Clone)]
pub struct CodeHasher {
    mac: HmacSha256,
}

impl CodeHasher {
    pub fn new(secret: &str) -> anyhow::Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("otp secret must not be empty");
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid otp secret: {e}"))?;
        Ok(Self { mac })
    }

    pub fn hash(&self, email: &Email, purpose: OtpPurpose, code: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(purpose.as_str().as_bytes());
        mac.update(&[0]);
        mac.update(email.as_str().as_bytes());
        mac.update(&[0]);
        mac.update(code.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time comparison of `code` against a stored hash.
    pub fn matches(&self, email: &Email, purpose: OtpPurpose, code: &str, stored: &str) -> bool {
        let computed = self.hash(email, purpose, code);
        computed.as_bytes().ct_eq(stored.as_bytes()).into()
    }
}
