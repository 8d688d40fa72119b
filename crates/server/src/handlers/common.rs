//! Shared handler types and helpers.

use axum::Json;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Bare success payload.
#[derive(Debug, Serialize)]
pub struct StatusOnly {
    pub status: bool,
}

/// Query carrying a share token, used by delete endpoints.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

/// How many times creation regenerates the token after a store collision
/// before giving up with `Conflict`.
pub(crate) const MAX_TOKEN_ATTEMPTS: usize = 5;

/// GET /v1/health - liveness probe.
pub async fn health_check() -> Json<StatusOnly> {
    Json(StatusOnly { status: true })
}

/// Accessor identifier recorded in the clickers audit trail.
pub(crate) fn clicker_id(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Resolve an optional user-supplied expiry window to an absolute time.
/// Malformed input degrades to "never expires" rather than failing creation.
pub(crate) fn expire_at_from(
    expire_in: Option<&str>,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    let value = expire_in?;
    if value.is_empty() {
        return None;
    }
    match wisp_core::parse_expire_in(value) {
        Ok(duration) => Some(now + duration),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed expiry window");
            None
        }
    }
}

/// Resolve an optional user-supplied click limit string. Malformed input
/// degrades to "no click expiry".
pub(crate) fn parse_expire_clicks_param(value: Option<&str>) -> Option<i64> {
    let value = value?;
    if value.is_empty() {
        return None;
    }
    match wisp_core::parse_expire_clicks(value) {
        Ok(limit) => limit,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed click limit");
            None
        }
    }
}

/// Normalize a JSON-supplied click limit: zero and negative mean no limit.
pub(crate) fn normalize_expire_clicks(value: Option<i64>) -> Option<i64> {
    match value {
        Some(limit) if limit > 0 => Some(limit),
        Some(limit) if limit < 0 => {
            tracing::warn!(value = limit, "Ignoring negative click limit");
            None
        }
        _ => None,
    }
}
