//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::HeaderValue,
    response::{IntoResponse, Redirect},
};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a token to its original URL.
///
/// # Endpoint
///
/// `GET /s/{token}`
///
/// Returns 307 Temporary Redirect. A record with an empty body (as served by
/// the mocked backend) has nowhere to redirect to and yields 404.
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed token or a stored URL that is not
/// a valid `Location` value, and 404 Not Found if the token has no record.
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let long_url = state.link_service.expand(&token).await?;

    if long_url.is_empty() {
        debug!(token = %token, "Record is empty, nothing to redirect to");
        return Err(AppError::not_found(
            "Short link has no target",
            json!({ "token": token }),
        ));
    }

    if HeaderValue::from_str(&long_url).is_err() {
        debug!(token = %token, "Stored URL is not a valid Location value");
        return Err(AppError::bad_request(
            "Short link target cannot be used as a redirect",
            json!({ "token": token }),
        ));
    }

    Ok(Redirect::temporary(&long_url))
}
