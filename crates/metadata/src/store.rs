//! Record store trait and SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{LinkRow, UploadRow, UserRow};
use crate::repos::{LinkRepo, UploadRepo, UserRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined record store capability.
#[async_trait]
pub trait RecordStore: LinkRepo + UploadRepo + UserRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS links (
    token         TEXT PRIMARY KEY,
    url           TEXT NOT NULL,
    short_url     TEXT NOT NULL,
    clicks        INTEGER NOT NULL DEFAULT 0,
    clickers      TEXT NOT NULL DEFAULT '[]',
    created_at    TEXT NOT NULL,
    expire_at     TEXT,
    expire_clicks INTEGER
);

CREATE TABLE IF NOT EXISTS uploads (
    token         TEXT PRIMARY KEY,
    object_key    TEXT NOT NULL,
    filename      TEXT NOT NULL,
    content_type  TEXT,
    short_url     TEXT NOT NULL,
    clicks        INTEGER NOT NULL DEFAULT 0,
    clickers      TEXT NOT NULL DEFAULT '[]',
    created_at    TEXT NOT NULL,
    expire_at     TEXT,
    expire_clicks INTEGER
);

CREATE TABLE IF NOT EXISTS users (
    user_key      TEXT PRIMARY KEY,
    email         TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);
"#;

/// SQLite-based record store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store at `path`, running migrations.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection
            // avoids persistent "database is locked" failures under axum
            // concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::debug!(path = %path.display(), "Record store opened");

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

/// Map a unique-constraint violation on insert to `AlreadyExists` so callers
/// can retry with a regenerated token.
fn map_insert_err(e: sqlx::Error, what: String) -> MetadataError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE constraint") => {
            MetadataError::AlreadyExists(what)
        }
        _ => MetadataError::Database(e),
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LinkRepo for SqliteStore {
    async fn create_link(&self, link: &LinkRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO links (token, url, short_url, clicks, clickers, created_at, expire_at, expire_clicks)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&link.token)
        .bind(&link.url)
        .bind(&link.short_url)
        .bind(link.clicks)
        .bind(&link.clickers)
        .bind(link.created_at)
        .bind(link.expire_at)
        .bind(link.expire_clicks)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, format!("link token {}", link.token)))?;
        Ok(())
    }

    async fn get_link(&self, token: &str) -> MetadataResult<Option<LinkRow>> {
        let row = sqlx::query_as::<_, LinkRow>("SELECT * FROM links WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save_link_access(
        &self,
        token: &str,
        clicks: i64,
        clickers: &[String],
    ) -> MetadataResult<()> {
        let result = sqlx::query("UPDATE links SET clicks = ?, clickers = ? WHERE token = ?")
            .bind(clicks)
            .bind(Json(clickers))
            .bind(token)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("link token {token}")));
        }
        Ok(())
    }

    async fn delete_link(&self, token: &str) -> MetadataResult<()> {
        let result = sqlx::query("DELETE FROM links WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("link token {token}")));
        }
        Ok(())
    }

    async fn list_links(&self) -> MetadataResult<Vec<LinkRow>> {
        let rows = sqlx::query_as::<_, LinkRow>("SELECT * FROM links ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl UploadRepo for SqliteStore {
    async fn create_upload(&self, upload: &UploadRow) -> MetadataResult<()> {
        sqlx::query(
            r#"
            INSERT INTO uploads (
                token, object_key, filename, content_type, short_url,
                clicks, clickers, created_at, expire_at, expire_clicks
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&upload.token)
        .bind(&upload.object_key)
        .bind(&upload.filename)
        .bind(&upload.content_type)
        .bind(&upload.short_url)
        .bind(upload.clicks)
        .bind(&upload.clickers)
        .bind(upload.created_at)
        .bind(upload.expire_at)
        .bind(upload.expire_clicks)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, format!("upload token {}", upload.token)))?;
        Ok(())
    }

    async fn get_upload(&self, token: &str) -> MetadataResult<Option<UploadRow>> {
        let row = sqlx::query_as::<_, UploadRow>("SELECT * FROM uploads WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn save_upload_access(
        &self,
        token: &str,
        clicks: i64,
        clickers: &[String],
    ) -> MetadataResult<()> {
        let result = sqlx::query("UPDATE uploads SET clicks = ?, clickers = ? WHERE token = ?")
            .bind(clicks)
            .bind(Json(clickers))
            .bind(token)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("upload token {token}")));
        }
        Ok(())
    }

    async fn delete_upload(&self, token: &str) -> MetadataResult<()> {
        let result = sqlx::query("DELETE FROM uploads WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(MetadataError::NotFound(format!("upload token {token}")));
        }
        Ok(())
    }

    async fn list_uploads(&self) -> MetadataResult<Vec<UploadRow>> {
        let rows = sqlx::query_as::<_, UploadRow>("SELECT * FROM uploads ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn create_user(&self, user: &UserRow) -> MetadataResult<()> {
        sqlx::query(
            "INSERT INTO users (user_key, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.user_key)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_err(e, format!("user key {}", user.user_key)))?;
        Ok(())
    }

    async fn get_user(&self, user_key: &str) -> MetadataResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_key = ?")
            .bind(user_key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
