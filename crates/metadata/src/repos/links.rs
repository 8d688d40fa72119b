//! Short link repository.

use crate::error::MetadataResult;
use crate::models::LinkRow;
use async_trait::async_trait;

/// Repository for short link records.
#[async_trait]
pub trait LinkRepo: Send + Sync {
    /// Insert a new link keyed by its token.
    /// Fails with `AlreadyExists` on a token collision.
    async fn create_link(&self, link: &LinkRow) -> MetadataResult<()>;

    /// Get a link by token.
    async fn get_link(&self, token: &str) -> MetadataResult<Option<LinkRow>>;

    /// Persist updated access state for a link.
    async fn save_link_access(
        &self,
        token: &str,
        clicks: i64,
        clickers: &[String],
    ) -> MetadataResult<()>;

    /// Delete a link. Deleting an absent token is `NotFound`.
    async fn delete_link(&self, token: &str) -> MetadataResult<()>;

    /// List all links. Full scan; acceptable at this deployment scale and
    /// relied on by the sweeper.
    async fn list_links(&self) -> MetadataResult<Vec<LinkRow>>;
}
