//! Click accounting for share accesses.
//!
//! Each access increments the record's counter, appends the accessor to the
//! audit trail, persists, and evaluates the expiration predicate on the
//! post-increment state. Accounting never deletes: the sweeper is the
//! authoritative reclaimer, so an access that crosses the click limit is
//! still served and the record is collected on the next sweep.
//!
//! The read-modify-write is not atomic across concurrent accesses to the
//! same token; two racing accesses can under-count. Accepted at this scale.

use crate::error::{ApiError, ApiResult};
use time::OffsetDateTime;
use wisp_core::Expirable;
use wisp_metadata::RecordStore;
use wisp_metadata::models::{LinkRow, UploadRow};

/// Record an access to a link. Returns the updated record and whether it is
/// now expired.
pub async fn record_link_access(
    metadata: &dyn RecordStore,
    token: &str,
    clicker: &str,
    now: OffsetDateTime,
) -> ApiResult<(LinkRow, bool)> {
    let mut link = metadata
        .get_link(token)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("link token {token}")))?;

    link.clicks += 1;
    link.clickers.0.push(clicker.to_string());
    metadata
        .save_link_access(token, link.clicks, &link.clickers.0)
        .await?;

    let expired = link.is_expired(now);
    Ok((link, expired))
}

/// Record an access to an upload. Returns the updated record and whether it
/// is now expired.
pub async fn record_upload_access(
    metadata: &dyn RecordStore,
    token: &str,
    clicker: &str,
    now: OffsetDateTime,
) -> ApiResult<(UploadRow, bool)> {
    let mut upload = metadata
        .get_upload(token)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("upload token {token}")))?;

    upload.clicks += 1;
    upload.clickers.0.push(clicker.to_string());
    metadata
        .save_upload_access(token, upload.clicks, &upload.clickers.0)
        .await?;

    let expired = upload.is_expired(now);
    Ok((upload, expired))
}
