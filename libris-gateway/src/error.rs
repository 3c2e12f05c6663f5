//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use libris_core::ApiResponse;

/// Errors that can occur while forwarding a request upstream.
///
/// Every variant renders as the same `500` envelope; the variant only
/// changes the message text.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The upstream base joined with the requested path is not a valid URL.
    #[error("invalid upstream URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    /// The upstream could not be reached or its response could not be read.
    #[error(transparent)]
    Upstream(#[from] reqwest::Error),

    /// The inbound request body could not be read.
    #[error("failed to read request body: {0}")]
    Body(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let envelope = ApiResponse::<()>::failure(self.to_string(), status.as_u16(), Utc::now());
        (status, Json(envelope)).into_response()
    }
}
