//! Session markers for the access gate.
//!
//! A marker is `<unix-expiry>.<hex sha256(secret || "." || expiry)>`. It is
//! an authorization cache so browsers skip re-presenting their token on
//! every request; it is explicitly not a security boundary.

use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

/// Issue a session marker valid for `ttl` from `now`.
pub fn issue(secret: &str, now: OffsetDateTime, ttl: Duration) -> String {
    let expires = (now + ttl).unix_timestamp();
    format!("{expires}.{}", sign(secret, expires))
}

/// Verify a session marker against the signing secret at `now`.
pub fn verify(secret: &str, marker: &str, now: OffsetDateTime) -> bool {
    let Some((expiry, signature)) = marker.split_once('.') else {
        return false;
    };
    let Ok(expires) = expiry.parse::<i64>() else {
        return false;
    };
    if now.unix_timestamp() >= expires {
        return false;
    }
    sign(secret, expires) == signature
}

fn sign(secret: &str, expires: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(expires.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
