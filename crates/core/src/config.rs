//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Base URL used when building share links (scheme + host, no trailing slash).
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Length of generated share tokens.
    #[serde(default = "default_token_length")]
    pub token_length: usize,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_public_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_token_length() -> usize {
    crate::token::DEFAULT_TOKEN_LENGTH
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_url: default_public_url(),
            token_length: default_token_length(),
        }
    }
}

/// Blob storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for uploaded payloads.
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/blobs"),
        }
    }
}

/// Record store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/records.db"),
        }
    }
}

/// Access gate configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateConfig {
    /// Email recorded on the bootstrap administrator credential.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    /// Hostname that bypasses the gate for anonymous share access.
    /// Empty disables the bypass.
    #[serde(default)]
    pub secret_host: String,
    /// Hostname substituted for the secret host on bypassed requests.
    #[serde(default)]
    pub public_host: String,
    /// Length of the generated bootstrap secret.
    #[serde(default = "default_bootstrap_secret_length")]
    pub bootstrap_secret_length: usize,
}

fn default_admin_email() -> String {
    "admin@localhost".to_string()
}

fn default_bootstrap_secret_length() -> usize {
    40
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            admin_email: default_admin_email(),
            secret_host: String::new(),
            public_host: String::new(),
            bootstrap_secret_length: default_bootstrap_secret_length(),
        }
    }
}

/// Session marker configuration.
///
/// The session cookie is an authorization cache, not a security boundary:
/// it lets a browser skip re-presenting its token on every request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie name carrying the session marker.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Secret used to sign session markers. Required.
    #[serde(default)]
    pub secret: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cookie_name() -> String {
    "wisp_session".to_string()
}

fn default_session_ttl_secs() -> u64 {
    86400 // 24 hours
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secret: String::new(),
            ttl_secs: default_session_ttl_secs(),
        }
    }
}

/// Lifecycle sweeper configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Enable the periodic sweep task.
    #[serde(default = "default_sweep_enabled")]
    pub enabled: bool,
    /// Interval in seconds between sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
}

fn default_sweep_enabled() -> bool {
    true
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: default_sweep_enabled(),
            interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl SweepConfig {
    /// Get the sweep interval as a std Duration.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Record store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Access gate configuration.
    #[serde(default)]
    pub gate: GateConfig,
    /// Session marker configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Lifecycle sweeper configuration.
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl AppConfig {
    /// Validate configuration invariants. Returns an error message for
    /// settings that would misbehave at runtime.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.token_length == 0 {
            return Err("server.token_length must be at least 1".to_string());
        }
        if self.session.secret.is_empty() {
            return Err("session.secret must be set".to_string());
        }
        if self.sweep.enabled && self.sweep.interval_secs == 0 {
            // A zero interval would panic when creating the sweep timer.
            return Err("sweep.interval_secs must be at least 1".to_string());
        }
        if self.gate.secret_host.is_empty() != self.gate.public_host.is_empty() {
            return Err(
                "gate.secret_host and gate.public_host must be set together".to_string(),
            );
        }
        if self.gate.bootstrap_secret_length < 16 {
            return Err("gate.bootstrap_secret_length must be at least 16".to_string());
        }
        Ok(())
    }

    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses filesystem storage, SQLite records and a
    /// fixed session secret.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            metadata: MetadataConfig::default(),
            gate: GateConfig {
                secret_host: "secret.test".to_string(),
                public_host: "share.test".to_string(),
                ..GateConfig::default()
            },
            session: SessionConfig {
                secret: "test-session-secret".to_string(),
                ..SessionConfig::default()
            },
            sweep: SweepConfig {
                enabled: false,
                ..SweepConfig::default()
            },
        }
    }
}
