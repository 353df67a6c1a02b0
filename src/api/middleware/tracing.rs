//! HTTP request/response tracing middleware.
//!
//! Tokens are bearer capabilities: anyone holding one can resolve the link.
//! Request spans therefore log only a short prefix of the token in
//! `/s/{token}` paths.

use axum::http::Request;
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

use crate::application::services::link_service::SHORT_PATH_PREFIX;

/// Number of token characters kept in logged paths.
const VISIBLE_TOKEN_CHARS: usize = 4;

/// Builds request spans with redacted redirect paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedactedSpan;

impl<B> MakeSpan<B> for RedactedSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %redact_path(request.uri().path()),
            version = ?request.version(),
        )
    }
}

/// Shortens the token segment of `/s/{token}` paths; other paths pass through.
pub fn redact_path(path: &str) -> String {
    match path.strip_prefix(SHORT_PATH_PREFIX) {
        Some(token) if !token.is_empty() => {
            let visible: String = token.chars().take(VISIBLE_TOKEN_CHARS).collect();
            format!("{}{}***", SHORT_PATH_PREFIX, visible)
        }
        _ => path.to_string(),
    }
}

/// Creates a tracing middleware for HTTP requests.
///
/// **On Request:** an `INFO` span with method, redacted path and HTTP version.
///
/// **On Response:** an `INFO` event with status code and latency in milliseconds.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=GET path=/s/MZXW*** version=HTTP/1.1}: finished processing request latency=12 ms status=307
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RedactedSpan> {
    TraceLayer::new_for_http()
        .make_span_with(RedactedSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}
