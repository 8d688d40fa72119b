//! Integration tests for the lifecycle sweeper.

mod common;

use common::TestServer;
use time::{Duration, OffsetDateTime};
use wisp_metadata::Json;
use wisp_metadata::models::{LinkRow, UploadRow};
use wisp_server::sweep::sweep;

fn link(token: &str, expire_at: Option<OffsetDateTime>, expire_clicks: Option<i64>) -> LinkRow {
    LinkRow {
        token: token.to_string(),
        url: "https://example.com".to_string(),
        short_url: format!("http://share.test/l/{token}"),
        clicks: 0,
        clickers: Json(Vec::new()),
        created_at: OffsetDateTime::now_utc(),
        expire_at,
        expire_clicks,
    }
}

fn upload(token: &str, expire_at: Option<OffsetDateTime>, expire_clicks: Option<i64>) -> UploadRow {
    UploadRow {
        token: token.to_string(),
        object_key: format!("uploads/{token}/file.bin"),
        filename: "file.bin".to_string(),
        content_type: None,
        short_url: format!("http://share.test/u/{token}/file.bin"),
        clicks: 0,
        clickers: Json(Vec::new()),
        created_at: OffsetDateTime::now_utc(),
        expire_at,
        expire_clicks,
    }
}

#[tokio::test]
async fn records_without_expiry_are_never_swept() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let storage = server.storage();

    let mut heavily_used = link("AbCdEf", None, None);
    heavily_used.clicks = 1_000_000;
    metadata.create_link(&heavily_used).await.unwrap();

    let upload_row = upload("GhIjKl", None, None);
    storage
        .put(&upload_row.object_key, b"payload".to_vec().into())
        .await
        .unwrap();
    metadata.create_upload(&upload_row).await.unwrap();

    // Far-future clock: elapsed time alone must never reclaim these.
    let far_future = OffsetDateTime::now_utc() + Duration::days(365 * 10);
    let stats = sweep(metadata.as_ref(), storage.as_ref(), far_future).await;

    assert_eq!(stats.links_scanned, 1);
    assert_eq!(stats.uploads_scanned, 1);
    assert_eq!(stats.links_deleted, 0);
    assert_eq!(stats.uploads_deleted, 0);
    assert_eq!(stats.errors, 0);
    assert!(metadata.get_link("AbCdEf").await.unwrap().is_some());
    assert!(metadata.get_upload("GhIjKl").await.unwrap().is_some());
}

#[tokio::test]
async fn expired_upload_loses_payload_and_record() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let storage = server.storage();

    let now = OffsetDateTime::now_utc();
    let upload_row = upload("GhIjKl", Some(now + Duration::seconds(1)), None);
    storage
        .put(&upload_row.object_key, b"payload".to_vec().into())
        .await
        .unwrap();
    metadata.create_upload(&upload_row).await.unwrap();

    // Not yet expired.
    let stats = sweep(metadata.as_ref(), storage.as_ref(), now).await;
    assert_eq!(stats.uploads_deleted, 0);

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let stats = sweep(metadata.as_ref(), storage.as_ref(), OffsetDateTime::now_utc()).await;
    assert_eq!(stats.uploads_deleted, 1);
    assert_eq!(stats.errors, 0);
    assert!(!storage.exists(&upload_row.object_key).await.unwrap());
    assert!(metadata.get_upload("GhIjKl").await.unwrap().is_none());
}

#[tokio::test]
async fn click_limited_records_are_swept_once_the_limit_is_reached() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let storage = server.storage();
    let now = OffsetDateTime::now_utc();

    let mut limited = link("AbCdEf", None, Some(2));
    limited.clicks = 2;
    metadata.create_link(&limited).await.unwrap();

    let mut under = link("MnOpQr", None, Some(2));
    under.clicks = 1;
    metadata.create_link(&under).await.unwrap();

    let stats = sweep(metadata.as_ref(), storage.as_ref(), now).await;

    assert_eq!(stats.links_deleted, 1);
    assert!(metadata.get_link("AbCdEf").await.unwrap().is_none());
    assert!(metadata.get_link("MnOpQr").await.unwrap().is_some());
}

#[tokio::test]
async fn sweeping_twice_is_idempotent() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let storage = server.storage();
    let now = OffsetDateTime::now_utc();

    metadata
        .create_link(&link("AbCdEf", Some(now - Duration::seconds(5)), None))
        .await
        .unwrap();
    let upload_row = upload("GhIjKl", Some(now - Duration::seconds(5)), None);
    storage
        .put(&upload_row.object_key, b"payload".to_vec().into())
        .await
        .unwrap();
    metadata.create_upload(&upload_row).await.unwrap();
    metadata.create_link(&link("KeEpMe", None, None)).await.unwrap();

    let first = sweep(metadata.as_ref(), storage.as_ref(), now).await;
    assert_eq!(first.links_deleted, 1);
    assert_eq!(first.uploads_deleted, 1);

    let second = sweep(metadata.as_ref(), storage.as_ref(), now).await;
    assert_eq!(second.links_deleted, 0);
    assert_eq!(second.uploads_deleted, 0);
    assert_eq!(second.errors, 0);

    // Final state matches a single sweep: only the unexpiring link remains.
    assert_eq!(metadata.list_links().await.unwrap().len(), 1);
    assert!(metadata.list_uploads().await.unwrap().is_empty());
}

#[tokio::test]
async fn payload_delete_failure_keeps_record_and_spares_others() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let storage = server.storage();
    let now = OffsetDateTime::now_utc();

    // An object key the filesystem backend refuses to touch: deletion fails
    // with InvalidKey, which must not count as reclaimed.
    let mut poisoned = upload("BaDkEy", Some(now - Duration::seconds(5)), None);
    poisoned.object_key = "../outside".to_string();
    metadata.create_upload(&poisoned).await.unwrap();

    let healthy = upload("GoOdKy", Some(now - Duration::seconds(5)), None);
    storage
        .put(&healthy.object_key, b"payload".to_vec().into())
        .await
        .unwrap();
    metadata.create_upload(&healthy).await.unwrap();

    let stats = sweep(metadata.as_ref(), storage.as_ref(), now).await;

    // Per-record isolation: the poisoned record stays, the healthy one goes.
    assert_eq!(stats.uploads_deleted, 1);
    assert_eq!(stats.errors, 1);
    assert!(metadata.get_upload("BaDkEy").await.unwrap().is_some());
    assert!(metadata.get_upload("GoOdKy").await.unwrap().is_none());
}

#[tokio::test]
async fn missing_payload_still_reclaims_the_record() {
    let server = TestServer::new().await;
    let metadata = server.metadata();
    let storage = server.storage();
    let now = OffsetDateTime::now_utc();

    // Expired upload whose payload is already gone: the record must not
    // survive as a tombstone.
    let orphan = upload("NoBlOb", Some(now - Duration::seconds(5)), None);
    metadata.create_upload(&orphan).await.unwrap();

    let stats = sweep(metadata.as_ref(), storage.as_ref(), now).await;

    assert_eq!(stats.uploads_deleted, 1);
    assert_eq!(stats.errors, 0);
    assert!(metadata.get_upload("NoBlOb").await.unwrap().is_none());
}
