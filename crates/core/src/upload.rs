//! Signed one-time upload tokens.
//!
//! The upload flow is: the client asks the API for an upload URL, receives a
//! token-bearing URL, and PUTs the file bytes to it. The token is self
//! contained -- `{storage_key}.{expiry}.{signature}` -- so no server-side
//! state is created until the bytes actually arrive. The signature is an
//! HMAC-SHA256 over the key and expiry; single use is enforced by the unique
//! storage key at insert time.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// A validated upload token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadToken {
    /// The storage key the uploaded object will be stored under.
    pub storage_key: Uuid,
    /// Expiry as a UTC Unix timestamp (seconds).
    pub expires_at: i64,
}

/// Issue a new upload token valid for `ttl_secs` from `now`.
///
/// The returned string is URL-safe: `{key}.{expiry}.{signature}` with the
/// key as a 32-char simple UUID and the signature hex encoded.
pub fn issue_upload_token(secret: &[u8], ttl_secs: u64, now: DateTime<Utc>) -> String {
    let key = Uuid::new_v4();
    let expires_at = now.timestamp() + ttl_secs as i64;
    let sig = sign(secret, key, expires_at);
    format!("{}.{expires_at}.{sig}", key.simple())
}

/// Validate an upload token against the signing secret and current time.
///
/// Returns the storage key on success. Tampered, malformed, and expired
/// tokens all fail with `CoreError::Validation`.
pub fn verify_upload_token(
    token: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<UploadToken, CoreError> {
    let mut parts = token.splitn(3, '.');
    let (key, expires_at, sig) = match (parts.next(), parts.next(), parts.next()) {
        (Some(k), Some(e), Some(s)) => (k, e, s),
        _ => return Err(invalid_token()),
    };

    let storage_key = Uuid::try_parse(key).map_err(|_| invalid_token())?;
    let expires_at: i64 = expires_at.parse().map_err(|_| invalid_token())?;

    let mut mac = mac_for(secret, storage_key, expires_at);
    let sig_bytes = decode_hex(sig).ok_or_else(invalid_token)?;
    mac.verify_slice(&sig_bytes).map_err(|_| invalid_token())?;

    if now.timestamp() > expires_at {
        return Err(CoreError::Validation("Upload token has expired".into()));
    }

    Ok(UploadToken {
        storage_key,
        expires_at,
    })
}

fn invalid_token() -> CoreError {
    CoreError::Validation("Invalid upload token".into())
}

fn mac_for(secret: &[u8], key: Uuid, expires_at: i64) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(key.as_bytes());
    mac.update(&expires_at.to_be_bytes());
    mac
}

fn sign(secret: &[u8], key: Uuid, expires_at: i64) -> String {
    let digest = mac_for(secret, key, expires_at).finalize().into_bytes();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }
    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&input[i..i + 2], 16).ok())
        .collect()
}
