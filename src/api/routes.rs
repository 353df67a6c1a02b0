//! API route configuration.

use crate::api::handlers::{expand_handler, shorten_handler};
use crate::state::AppState;
use axum::{Router, routing::post};

/// JSON API routes.
///
/// # Endpoints
///
/// - `POST /shorten` - Store a long URL, return its short URL
/// - `POST /expand`  - Resolve a short URL to its long URL
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/expand", post(expand_handler))
}
