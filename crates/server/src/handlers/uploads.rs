//! Upload handlers.

use crate::clicks;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{
    MAX_TOKEN_ATTEMPTS, StatusOnly, TokenQuery, clicker_id, expire_at_from,
    parse_expire_clicks_param,
};
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use wisp_metadata::Json as DbJson;
use wisp_metadata::MetadataError;
use wisp_metadata::models::UploadRow;
use wisp_storage::StorageError;

/// Multipart field name carrying the payload.
const UPLOAD_FIELD: &str = "uploadfile";

/// Query parameters accepted by the create endpoints.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Optional click limit. Malformed input degrades to no limit.
    pub clicks: Option<String>,
    /// Optional expiry window such as "90s". Malformed input degrades to
    /// no time expiry.
    pub time: Option<String>,
    /// When present, respond with the bare share URL as plain text.
    pub s: Option<String>,
}

/// Response for a created upload.
#[derive(Debug, Serialize)]
pub struct UploadCreated {
    pub status: bool,
    pub token: String,
    pub url: String,
    pub upload: UploadRow,
}

/// Response for the upload listing.
#[derive(Debug, Serialize)]
pub struct UploadList {
    pub status: bool,
    pub uploads: Vec<UploadRow>,
}

/// GET /v1/uploads - list all uploads.
pub async fn list_uploads(State(state): State<AppState>) -> ApiResult<Json<UploadList>> {
    let uploads = state.metadata.list_uploads().await?;
    Ok(Json(UploadList {
        status: true,
        uploads,
    }))
}

/// POST /v1/uploads - create an upload from a multipart form.
#[tracing::instrument(skip(state, multipart))]
pub async fn create_upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let mut part: Option<(String, Option<String>, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
            part = Some((filename, content_type, data));
            break;
        }
    }

    let (filename, content_type, data) = part.ok_or_else(|| {
        ApiError::BadRequest(format!("multipart field '{UPLOAD_FIELD}' is required"))
    })?;

    let upload = store_upload(&state, &filename, content_type, data, &query).await?;
    Ok(upload_response(upload, query.s.is_some()))
}

/// PUT /v1/uploads/{filename} - create an upload from a raw request body.
#[tracing::instrument(skip(state, body))]
pub async fn create_upload_raw(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Response> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let upload = store_upload(&state, &filename, content_type, body, &query).await?;
    Ok(upload_response(upload, query.s.is_some()))
}

/// DELETE /v1/uploads?token=T - delete an upload and its payload.
pub async fn delete_upload(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<StatusOnly>> {
    let upload = state
        .metadata
        .get_upload(&query.token)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("upload token {}", query.token)))?;

    // Payload first; a missing payload counts as already reclaimed. Any
    // other storage failure keeps the record so the payload stays reachable.
    match state.storage.delete(&upload.object_key).await {
        Ok(()) | Err(StorageError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    state.metadata.delete_upload(&query.token).await?;
    tracing::info!(token = %query.token, "Upload deleted");
    Ok(Json(StatusOnly { status: true }))
}

/// GET /u/{token}/{filename} - account the access and serve the payload.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path((token, _filename)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let clicker = clicker_id(&headers);
    let now = OffsetDateTime::now_utc();
    let (upload, expired) =
        clicks::record_upload_access(state.metadata.as_ref(), &token, &clicker, now).await?;

    if expired {
        // Still served: the sweeper is the authoritative reclaimer.
        tracing::debug!(token = %token, "Upload expired after this access");
    }

    let data = state.storage.get(&upload.object_key).await?;
    let content_type = upload
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let disposition = format!("inline; filename=\"{}\"", upload.filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Persist a new upload: the record insert reserves the token, then the
/// payload lands in the blob store. A payload write failure rolls the record
/// back so no metadata points at missing bytes.
async fn store_upload(
    state: &AppState,
    filename: &str,
    content_type: Option<String>,
    data: Bytes,
    query: &UploadQuery,
) -> ApiResult<UploadRow> {
    let filename = sanitize_filename(filename);
    let now = OffsetDateTime::now_utc();
    let expire_at = expire_at_from(query.time.as_deref(), now);
    let expire_clicks = parse_expire_clicks_param(query.clicks.as_deref());

    for _ in 0..MAX_TOKEN_ATTEMPTS {
        let token = wisp_core::generate(state.config.server.token_length);
        let object_key = format!("uploads/{token}/{filename}");
        let short_url = format!(
            "{}/u/{}/{}",
            state.config.server.public_url, token, filename
        );
        let upload = UploadRow {
            token: token.clone(),
            object_key: object_key.clone(),
            filename: filename.clone(),
            content_type: content_type.clone(),
            short_url,
            clicks: 0,
            clickers: DbJson(Vec::new()),
            created_at: now,
            expire_at,
            expire_clicks,
        };

        match state.metadata.create_upload(&upload).await {
            Ok(()) => {
                if let Err(e) = state.storage.put(&object_key, data.clone()).await {
                    if let Err(cleanup) = state.metadata.delete_upload(&token).await {
                        tracing::error!(
                            token = %token,
                            error = %cleanup,
                            "Failed to roll back record after payload write failure"
                        );
                    }
                    return Err(e.into());
                }
                tracing::info!(
                    token = %token,
                    filename = %filename,
                    size = data.len(),
                    "Upload created"
                );
                return Ok(upload);
            }
            Err(MetadataError::AlreadyExists(_)) => {
                tracing::debug!(token = %token, "Token collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ApiError::Conflict(
        "could not allocate a unique token".to_string(),
    ))
}

fn upload_response(upload: UploadRow, plain: bool) -> Response {
    if plain {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            upload.short_url,
        )
            .into_response()
    } else {
        Json(UploadCreated {
            status: true,
            token: upload.token.clone(),
            url: upload.short_url.clone(),
            upload,
        })
        .into_response()
    }
}

/// Reduce a client-supplied filename to a safe single path segment.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base.to_string()
    }
}
