//! Lifecycle sweeper.
//!
//! Scans all records, evaluates the expiration predicate against the current
//! wall clock and click counts, and reclaims expired ones. For uploads the
//! backing payload is deleted before the record so a failed payload delete
//! never leaves metadata-less bytes behind. Failures are isolated per
//! record: one bad payload does not block reclamation of the rest.

use crate::state::AppState;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use wisp_core::Expirable;
use wisp_metadata::{MetadataError, RecordStore};
use wisp_storage::{BlobStore, StorageError};

/// Counters from a single sweep run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepStats {
    pub links_scanned: u64,
    pub links_deleted: u64,
    pub uploads_scanned: u64,
    pub uploads_deleted: u64,
    pub errors: u64,
}

/// Run one sweep over all records.
///
/// Idempotent: a second run with no intervening traffic finds nothing to
/// reclaim. Concurrent accesses may expire a record after its evaluation
/// here; the next sweep catches it.
pub async fn sweep(
    metadata: &dyn RecordStore,
    storage: &dyn BlobStore,
    now: OffsetDateTime,
) -> SweepStats {
    let mut stats = SweepStats::default();

    match metadata.list_links().await {
        Ok(links) => {
            for link in links {
                stats.links_scanned += 1;
                if !link.is_expired(now) {
                    continue;
                }
                match metadata.delete_link(&link.token).await {
                    Ok(()) => {
                        stats.links_deleted += 1;
                        tracing::info!(token = %link.token, "Expired link reclaimed");
                    }
                    // Deleted concurrently; already reclaimed.
                    Err(MetadataError::NotFound(_)) => {}
                    Err(e) => {
                        stats.errors += 1;
                        tracing::error!(token = %link.token, error = %e, "Failed to reclaim expired link");
                    }
                }
            }
        }
        Err(e) => {
            stats.errors += 1;
            tracing::error!(error = %e, "Failed to list links for sweep");
        }
    }

    match metadata.list_uploads().await {
        Ok(uploads) => {
            for upload in uploads {
                stats.uploads_scanned += 1;
                if !upload.is_expired(now) {
                    continue;
                }

                // Payload first. A missing payload counts as already
                // reclaimed; any other failure keeps the record so the
                // payload stays reachable for the next sweep.
                match storage.delete(&upload.object_key).await {
                    Ok(()) | Err(StorageError::NotFound(_)) => {}
                    Err(e) => {
                        stats.errors += 1;
                        tracing::error!(
                            token = %upload.token,
                            object_key = %upload.object_key,
                            error = %e,
                            "Failed to delete expired payload, keeping record"
                        );
                        continue;
                    }
                }

                match metadata.delete_upload(&upload.token).await {
                    Ok(()) => {
                        stats.uploads_deleted += 1;
                        tracing::info!(token = %upload.token, "Expired upload reclaimed");
                    }
                    Err(MetadataError::NotFound(_)) => {}
                    Err(e) => {
                        stats.errors += 1;
                        tracing::error!(token = %upload.token, error = %e, "Failed to reclaim expired upload");
                    }
                }
            }
        }
        Err(e) => {
            stats.errors += 1;
            tracing::error!(error = %e, "Failed to list uploads for sweep");
        }
    }

    stats
}

/// Spawn the periodic sweep task.
pub fn spawn_sweeper(state: AppState, interval: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "Sweeper started");
        loop {
            tokio::time::sleep(interval).await;
            let stats = sweep(
                state.metadata.as_ref(),
                state.storage.as_ref(),
                OffsetDateTime::now_utc(),
            )
            .await;
            if stats.links_deleted + stats.uploads_deleted > 0 || stats.errors > 0 {
                tracing::info!(
                    links_deleted = stats.links_deleted,
                    uploads_deleted = stats.uploads_deleted,
                    errors = stats.errors,
                    "Sweep finished"
                );
            }
        }
    })
}
