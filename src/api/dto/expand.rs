//! DTOs for the link expansion endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to resolve a short URL, `/s/<token>` path or bare token.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExpandRequest {
    #[validate(length(min = 1, message = "shortUrl must not be empty"))]
    pub short_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandResponse {
    pub long_url: String,
}
