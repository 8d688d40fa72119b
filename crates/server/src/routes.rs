//! Route configuration.

use crate::auth::access_gate;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, put};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let gated = Router::new()
        .route(
            "/v1/links",
            get(handlers::list_links)
                .post(handlers::create_link)
                .delete(handlers::delete_link),
        )
        .route(
            "/v1/uploads",
            get(handlers::list_uploads)
                .post(handlers::create_upload)
                .delete(handlers::delete_upload),
        )
        .route("/v1/uploads/{filename}", put(handlers::create_upload_raw))
        // Share endpoints: anonymous access goes through the secret-host
        // bypass inside the gate.
        .route("/l/{token}", get(handlers::follow_link))
        .route("/u/{token}/{filename}", get(handlers::serve_upload))
        .layer(middleware::from_fn_with_state(state.clone(), access_gate));

    Router::new()
        // Health check (intentionally ungated for load balancer probes)
        .route("/v1/health", get(handlers::health_check))
        .merge(gated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
