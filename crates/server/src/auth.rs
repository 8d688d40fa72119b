//! Access gate middleware.
//!
//! Every resource operation passes through here first. A request is
//! authorized by (in order): a prior session marker, an explicit
//! authorization token, the anonymous-share hostname bypass, or the
//! first-run bootstrap of a fresh deployment. Everything else is rejected
//! before any handler runs.

use crate::bootstrap::{self, BootstrapOutcome};
use crate::error::ApiError;
use crate::session;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::{COOKIE, HOST, SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

/// Header carrying an explicit per-request authorization token.
const AUTH_HEADER: &str = "x-authorization";

/// Query parameter fallback for clients that cannot set headers.
const AUTH_QUERY_PARAM: &str = "authorization";

/// Derive the credential lookup key for a presented token.
///
/// Credentials are indexed under this one-way hash so the plaintext secret
/// itself is never stored.
pub fn derived_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Access gate middleware.
pub async fn access_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let now = OffsetDateTime::now_utc();
    let session_config = &state.config.session;

    // A valid session marker short-circuits token validation entirely.
    if let Some(marker) = cookie_value(req.headers(), &session_config.cookie_name) {
        if session::verify(&session_config.secret, &marker, now) {
            return Ok(next.run(req).await);
        }
    }

    // Explicit per-request token: resolve the credential via its derived key.
    if let Some(token) = request_token(&req) {
        return match state.metadata.get_user(&derived_key(&token)).await? {
            Some(_) => Ok(authorize(&state, req, next).await),
            None => Err(ApiError::Unauthorized(
                "invalid authorization token".to_string(),
            )),
        };
    }

    // Anonymous share bypass: requests addressed to the secret hostname are
    // presented to handlers as if they arrived on the public hostname.
    let gate = &state.config.gate;
    if !gate.secret_host.is_empty() && header_host(req.headers()) == Some(gate.secret_host.as_str())
    {
        let public = HeaderValue::from_str(&gate.public_host)
            .map_err(|_| ApiError::Internal("configured public_host is not a valid host".to_string()))?;
        req.headers_mut().insert(HOST, public);
        return Ok(next.run(req).await);
    }

    // No token, no session, not the share host: the admin path is open only
    // until the deployment is bootstrapped.
    match bootstrap::read_or_create_admin(state.metadata.as_ref(), gate).await? {
        BootstrapOutcome::Created { secret } => {
            // Logged exactly once; the operator copies it out of the log.
            tracing::warn!(
                token = %secret,
                "Bootstrap secret issued; store it now, it is never shown again"
            );
            Ok(authorize(&state, req, next).await)
        }
        BootstrapOutcome::Present => Err(ApiError::Unauthorized(
            "authorization required".to_string(),
        )),
    }
}

/// Run the request and, for interactive clients, attach a session marker so
/// follow-up requests skip token validation.
async fn authorize(state: &AppState, req: Request, next: Next) -> Response {
    let interactive = !is_cli_client(req.headers());
    let mut response = next.run(req).await;

    if interactive {
        let session_config = &state.config.session;
        let ttl = Duration::seconds(i64::try_from(session_config.ttl_secs).unwrap_or(i64::MAX));
        let marker = session::issue(&session_config.secret, OffsetDateTime::now_utc(), ttl);
        let cookie = format!(
            "{}={}; Path=/; HttpOnly",
            session_config.cookie_name, marker
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

/// Extract the authorization token from the request, header first.
fn request_token(req: &Request) -> Option<String> {
    if let Some(value) = req.headers().get(AUTH_HEADER) {
        if let Ok(token) = value.to_str() {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let prefix = format!("{AUTH_QUERY_PARAM}=");
    req.uri().query()?.split('&').find_map(|pair| {
        pair.strip_prefix(prefix.as_str())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// Find a cookie value by name in the Cookie header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;
    let prefix = format!("{name}=");
    header.split(';').map(str::trim).find_map(|cookie| {
        cookie
            .strip_prefix(prefix.as_str())
            .map(str::to_string)
    })
}

/// Get the Host header as a string.
fn header_host(headers: &HeaderMap) -> Option<&str> {
    headers.get(HOST).and_then(|value| value.to_str().ok())
}

/// Coarse detection of non-interactive clients: they get no session cookie.
fn is_cli_client(headers: &HeaderMap) -> bool {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|agent| {
            let agent = agent.to_lowercase();
            agent.contains("curl") || agent.contains("wget")
        })
        .unwrap_or(false)
}
