//! Credential repository.

use crate::error::MetadataResult;
use crate::models::UserRow;
use async_trait::async_trait;

/// Repository for access gate credentials.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a credential. Fails with `AlreadyExists` if the key is taken;
    /// the gate relies on this for its read-or-create bootstrap.
    async fn create_user(&self, user: &UserRow) -> MetadataResult<()>;

    /// Get a credential by lookup key.
    async fn get_user(&self, user_key: &str) -> MetadataResult<Option<UserRow>>;
}
