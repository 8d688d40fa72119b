//! HTTP control plane for the wisp sharing service.
//!
//! This crate wires the domain logic to the outside world:
//! - Access gate middleware with first-run credential bootstrap
//! - Click accounting for share accesses
//! - The lifecycle sweeper that reclaims expired records and payloads
//! - Link and upload handlers

pub mod auth;
pub mod bootstrap;
pub mod clicks;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;
pub mod sweep;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
