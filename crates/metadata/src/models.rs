//! Database models mapping to the record schema.

use serde::Serialize;
use sqlx::FromRow;
use sqlx::types::Json;
use time::OffsetDateTime;
use wisp_core::Expirable;

/// Short link record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LinkRow {
    /// Share token; primary key, immutable after creation.
    pub token: String,
    /// Target URL the short link resolves to.
    pub url: String,
    /// Public share URL handed back to the creator.
    pub short_url: String,
    /// Access count; only ever incremented.
    pub clicks: i64,
    /// Accessor identifiers, kept for audit. Does not deduplicate counting.
    pub clickers: Json<Vec<String>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Absent means no time-based expiration.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expire_at: Option<OffsetDateTime>,
    /// Absent means no click-based expiration.
    pub expire_clicks: Option<i64>,
}

/// Uploaded file record. The payload itself lives in the blob store under
/// `object_key`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UploadRow {
    /// Share token; primary key, immutable after creation.
    pub token: String,
    /// Blob store key of the backing payload.
    pub object_key: String,
    /// Original filename, echoed in the share URL.
    pub filename: String,
    /// Declared content type, if the uploader provided one.
    pub content_type: Option<String>,
    /// Public share URL handed back to the creator.
    pub short_url: String,
    /// Access count; only ever incremented.
    pub clicks: i64,
    /// Accessor identifiers, kept for audit. Does not deduplicate counting.
    pub clickers: Json<Vec<String>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Absent means no time-based expiration.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expire_at: Option<OffsetDateTime>,
    /// Absent means no click-based expiration.
    pub expire_clicks: Option<i64>,
}

/// Access gate credential.
///
/// The bootstrap administrator is stored twice: under the literal `admin`
/// key and under the sha256 of the generated secret, so the plaintext secret
/// authorizes requests without ever being persisted.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    /// Lookup key: `admin` or a derived one-way hash.
    pub user_key: String,
    pub email: String,
    /// Argon2id hash of the bootstrap secret.
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl Expirable for LinkRow {
    fn clicks(&self) -> i64 {
        self.clicks
    }
    fn expire_clicks(&self) -> Option<i64> {
        self.expire_clicks
    }
    fn expire_at(&self) -> Option<OffsetDateTime> {
        self.expire_at
    }
}

impl Expirable for UploadRow {
    fn clicks(&self) -> i64 {
        self.clicks
    }
    fn expire_clicks(&self) -> Option<i64> {
        self.expire_clicks
    }
    fn expire_at(&self) -> Option<OffsetDateTime> {
        self.expire_at
    }
}
