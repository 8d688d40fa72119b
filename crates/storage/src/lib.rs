//! Blob storage abstraction and backends for wisp.
//!
//! Uploaded payloads live outside the record store, behind the [`BlobStore`]
//! capability. The only backend today is the local filesystem; the config
//! enum is the extension point for anything else.

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::filesystem::FilesystemBackend;
pub use error::{StorageError, StorageResult};
pub use traits::BlobStore;

use std::sync::Arc;
use wisp_core::config::StorageConfig;

/// Create a blob store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn BlobStore>> {
    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
    }
}
