//! Short link handlers.

use crate::clicks;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{
    MAX_TOKEN_ATTEMPTS, StatusOnly, TokenQuery, clicker_id, expire_at_from,
    normalize_expire_clicks,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Redirect;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use wisp_metadata::Json as DbJson;
use wisp_metadata::MetadataError;
use wisp_metadata::models::LinkRow;

/// Request body for creating a short link.
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    /// Target URL.
    pub url: String,
    /// Optional click limit; zero means no click-based expiry.
    pub expire_clicks: Option<i64>,
    /// Optional expiry window such as "90s" or "2h".
    pub expire_in: Option<String>,
}

/// Response for a created link.
#[derive(Debug, Serialize)]
pub struct LinkCreated {
    pub status: bool,
    pub token: String,
    pub url: String,
    pub link: LinkRow,
}

/// Response for the link listing.
#[derive(Debug, Serialize)]
pub struct LinkList {
    pub status: bool,
    pub links: Vec<LinkRow>,
}

/// GET /v1/links - list all links.
pub async fn list_links(State(state): State<AppState>) -> ApiResult<Json<LinkList>> {
    let links = state.metadata.list_links().await?;
    Ok(Json(LinkList {
        status: true,
        links,
    }))
}

/// POST /v1/links - create a short link.
#[tracing::instrument(skip(state, req))]
pub async fn create_link(
    State(state): State<AppState>,
    Json(req): Json<CreateLinkRequest>,
) -> ApiResult<Json<LinkCreated>> {
    if req.url.is_empty() {
        return Err(ApiError::BadRequest("url is required".to_string()));
    }

    let now = OffsetDateTime::now_utc();
    let expire_at = expire_at_from(req.expire_in.as_deref(), now);
    let expire_clicks = normalize_expire_clicks(req.expire_clicks);

    for _ in 0..MAX_TOKEN_ATTEMPTS {
        let token = wisp_core::generate(state.config.server.token_length);
        let short_url = format!("{}/l/{}", state.config.server.public_url, token);
        let link = LinkRow {
            token: token.clone(),
            url: req.url.clone(),
            short_url: short_url.clone(),
            clicks: 0,
            clickers: DbJson(Vec::new()),
            created_at: now,
            expire_at,
            expire_clicks,
        };

        match state.metadata.create_link(&link).await {
            Ok(()) => {
                tracing::info!(token = %token, "Link created");
                return Ok(Json(LinkCreated {
                    status: true,
                    token,
                    url: short_url,
                    link,
                }));
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

/// DELETE /v1/links?token=T - delete a link.
pub async fn delete_link(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> ApiResult<Json<StatusOnly>> {
    match state.metadata.delete_link(&query.token).await {
        Ok(()) => {
            tracing::info!(token = %query.token, "Link deleted");
            Ok(Json(StatusOnly { status: true }))
        }
        Err(MetadataError::NotFound(_)) => {
            Err(ApiError::NotFound(format!("link token {}", query.token)))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /l/{token} - account the access and redirect to the target URL.
pub async fn follow_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Redirect> {
    let clicker = clicker_id(&headers);
    let now = OffsetDateTime::now_utc();
    let (link, expired) =
        clicks::record_link_access(state.metadata.as_ref(), &token, &clicker, now).await?;

    if expired {
        // Still served: the sweeper is the authoritative reclaimer.
        tracing::debug!(token = %token, "Link expired after this access");
    }

    Ok(Redirect::temporary(&link.url))
}
