//! Signed cookie values.
//!
//! A signed value has the form `s:<value>.<signature>`, where the signature
//! is the unpadded base64url encoding of HMAC-SHA256(`value`) under the
//! application secret.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Marker prepended to every signed value.
pub const SIGNED_PREFIX: &str = "s:";

/// Signs and verifies cookie values with a shared secret.
#[derive(Clone)]
pub struct CookieSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSigner").finish_non_exhaustive()
    }
}

impl CookieSigner {
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config("cookie secret must not be empty".into()));
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| Error::Config(format!("invalid cookie secret: {e}")))?;
        Ok(Self { mac })
    }

    /// Sign `value`, producing `s:<value>.<signature>`.
    pub fn sign(&self, value: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(value.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{SIGNED_PREFIX}{value}.{signature}")
    }

    /// Verify a signed value and return the original value.
    ///
    /// Returns `None` when the prefix is missing, the value is malformed, or
    /// the signature does not match. The comparison is constant-time.
    pub fn unsign(&self, signed: &str) -> Option<String> {
        let body = signed.strip_prefix(SIGNED_PREFIX)?;
        let (value, signature) = body.rsplit_once('.')?;
        if value.is_empty() {
            return None;
        }
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(value.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(value.to_string())
    }
}
