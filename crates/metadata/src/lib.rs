//! Record store abstraction and implementations for wisp.
//!
//! This crate provides the control-plane data model:
//! - Link and upload resource records with access counters
//! - Credentials for the access gate
//! - The combined [`RecordStore`] capability and its SQLite implementation

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use sqlx::types::Json;
pub use store::{RecordStore, SqliteStore};

use std::sync::Arc;
use wisp_core::config::MetadataConfig;

/// Create a record store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn RecordStore>> {
    match config {
        MetadataConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn RecordStore>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_config_sqlite() {
        let temp = tempfile::tempdir().unwrap();
        let config = MetadataConfig::Sqlite {
            path: temp.path().join("records.db"),
        };

        let store = from_config(&config).await.unwrap();
        store.health_check().await.unwrap();
    }
}
