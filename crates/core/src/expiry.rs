//! Expiration policy shared by links and uploads.

use time::{Duration, OffsetDateTime};

/// A record that can expire by click count or by wall-clock time.
///
/// The predicate lives here so links and uploads cannot drift apart; the
/// variants differ only in how their backing payload is cleaned up, which is
/// the caller's concern.
pub trait Expirable {
    /// Number of accesses recorded so far.
    fn clicks(&self) -> i64;

    /// Click limit; `None` or zero means no click-based expiration.
    fn expire_clicks(&self) -> Option<i64>;

    /// Absolute expiry time; `None` means no time-based expiration.
    fn expire_at(&self) -> Option<OffsetDateTime>;

    /// Whether the record is expired at `now`.
    ///
    /// The time clause is monotonic in `now`: once true it stays true.
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        if let Some(at) = self.expire_at() {
            if now >= at {
                return true;
            }
        }
        match self.expire_clicks() {
            Some(limit) if limit > 0 => self.clicks() >= limit,
            _ => false,
        }
    }
}

/// Parse a user-supplied expiry window such as `"90s"`, `"5m"` or `"2h"`.
pub fn parse_expire_in(value: &str) -> crate::Result<Duration> {
    let std_duration = humantime::parse_duration(value)
        .map_err(|e| crate::Error::InvalidExpiry(format!("bad duration {value:?}: {e}")))?;
    Duration::try_from(std_duration)
        .map_err(|_| crate::Error::InvalidExpiry(format!("duration out of range: {value:?}")))
}

/// Parse a user-supplied click limit. Zero is a valid input meaning "no
/// click-based expiration" and is normalized to `None`.
pub fn parse_expire_clicks(value: &str) -> crate::Result<Option<i64>> {
    let clicks: i64 = value
        .parse()
        .map_err(|e| crate::Error::InvalidExpiry(format!("bad click limit {value:?}: {e}")))?;
    if clicks < 0 {
        return Err(crate::Error::InvalidExpiry(format!(
            "click limit must be non-negative: {clicks}"
        )));
    }
    Ok(if clicks == 0 { None } else { Some(clicks) })
}
