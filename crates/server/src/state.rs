//! Application state shared across handlers.

use std::sync::Arc;
use wisp_core::config::AppConfig;
use wisp_metadata::RecordStore;
use wisp_storage::BlobStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Blob store for upload payloads.
    pub storage: Arc<dyn BlobStore>,
    /// Record store for links, uploads and credentials.
    pub metadata: Arc<dyn RecordStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if configuration validation fails; invalid config must stop
    /// the server before it accepts requests.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn BlobStore>,
        metadata: Arc<dyn RecordStore>,
    ) -> Self {
        if let Err(error) = config.validate() {
            panic!("Invalid configuration: {error}");
        }

        Self {
            config: Arc::new(config),
            storage,
            metadata,
        }
    }
}
