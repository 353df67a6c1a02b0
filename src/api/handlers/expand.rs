//! Handler for link expansion endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::expand::{ExpandRequest, ExpandResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Resolves a short URL to the long URL it was created from.
///
/// # Endpoint
///
/// `POST /expand`
///
/// # Request Body
///
/// ```json
/// { "shortUrl": "https://sho.rt/s/<token>" }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the token is malformed (no storage read is made)
/// - 404 Not Found if no record exists for the token
/// - 503/504 on storage failures
pub async fn expand_handler(
    State(state): State<AppState>,
    Json(payload): Json<ExpandRequest>,
) -> Result<Json<ExpandResponse>, AppError> {
    payload.validate()?;

    let long_url = state.link_service.expand(&payload.short_url).await?;

    Ok(Json(ExpandResponse { long_url }))
}
