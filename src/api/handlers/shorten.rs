//! Handler for link shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Stores a long URL and returns its short URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "longUrl": "https://example.com/report/123" }
/// ```
///
/// # Response
///
/// ```json
/// { "shortUrl": "https://sho.rt/s/<39-character token>" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if `longUrl` is empty or rejected by the URL
/// prefix policy, and 503/504 if the record cannot be written.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let short_url = state.link_service.shorten(&payload.long_url).await?;

    Ok(Json(ShortenResponse { short_url }))
}
