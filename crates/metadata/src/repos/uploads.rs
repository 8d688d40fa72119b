//! Upload repository.

use crate::error::MetadataResult;
use crate::models::UploadRow;
use async_trait::async_trait;

/// Repository for upload records.
#[async_trait]
pub trait UploadRepo: Send + Sync {
    /// Insert a new upload keyed by its token.
    /// Fails with `AlreadyExists` on a token collision.
    async fn create_upload(&self, upload: &UploadRow) -> MetadataResult<()>;

    /// Get an upload by token.
    async fn get_upload(&self, token: &str) -> MetadataResult<Option<UploadRow>>;

    /// Persist updated access state for an upload.
    async fn save_upload_access(
        &self,
        token: &str,
        clicks: i64,
        clickers: &[String],
    ) -> MetadataResult<()>;

    /// Delete an upload record. Deleting an absent token is `NotFound`.
    /// Callers are responsible for reclaiming the backing payload first.
    async fn delete_upload(&self, token: &str) -> MetadataResult<()>;

    /// List all uploads. Full scan; acceptable at this deployment scale and
    /// relied on by the sweeper.
    async fn list_uploads(&self) -> MetadataResult<Vec<UploadRow>>;
}
