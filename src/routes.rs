//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /shorten`   - Create a short URL
//! - `POST /expand`    - Resolve a short URL
//! - `GET  /s/{token}` - Redirect to the long URL
//! - `GET  /health`    - Storage reachability
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging with redacted tokens
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::api::routes::api_routes;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/s/{token}", get(redirect_handler))
        .route("/health", get(health_handler))
        .merge(api_routes())
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
