use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Checks the `x-line-signature` header value against the raw request body.
///
/// The platform signs the exact body bytes with HMAC-SHA256 keyed by the
/// channel secret and sends the digest as standard base64. Comparison goes
/// through `Mac::verify_slice`, which is constant-time, so a caller probing
/// byte-by-byte learns nothing from response timing. Any malformed header
/// (not base64, wrong digest length) is a plain mismatch, never an error.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(provided) = BASE64.decode(signature) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}
