//! HMAC-SHA256 request digests.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase hex HMAC-SHA256 of `payload` keyed with `secret`.
///
/// # Errors
///
/// Returns `AuthError::InvalidKey` if the MAC cannot be keyed.
pub fn compute_digest(secret: &[u8], payload: &[u8]) -> Result<String, AuthError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks `digest` against the HMAC of `payload` in constant time.
///
/// Hex case in `digest` is ignored.
///
/// # Errors
///
/// Returns `AuthError::InvalidKey` if the MAC cannot be keyed.
pub fn verify_digest(secret: &[u8], payload: &[u8], digest: &str) -> Result<bool, AuthError> {
    let expected = compute_digest(secret, payload)?;
    let supplied = digest.trim().to_ascii_lowercase();

    if expected.len() != supplied.len() {
        return Ok(false);
    }

    Ok(expected.as_bytes().ct_eq(supplied.as_bytes()).into())
}
