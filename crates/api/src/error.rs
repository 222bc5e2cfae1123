//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use mediaveil_shared::{ResolveError, TokenError};

use crate::proxy::ForwardError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Configuration errors (fatal to the request, not the process)
    #[error("Server is not configured: {0}")]
    Configuration(&'static str),

    // Authentication errors
    #[error("Unauthorized")]
    Unauthorized,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Video not found")]
    NotFound,

    // Upstream errors
    #[error("Streaming error")]
    UpstreamUnavailable,

    // Internal errors
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Configuration(_) => {
                tracing::error!(error = %self, "Request rejected by missing configuration");
                (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::UpstreamUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_UNAVAILABLE")
            }
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // Configuration details stay in the logs
        let message = match &self {
            ApiError::Configuration(_) => "Server configuration error".to_string(),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingSecret => ApiError::Configuration("URL_ENCRYPTION_KEY is not set"),
            TokenError::EmptyOrigin => ApiError::Validation("Video URL required".to_string()),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidOrigin(detail) => {
                // Registration only admits absolute URLs
                tracing::error!(detail = %detail, "Registered origin failed to parse");
                ApiError::Internal
            }
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl From<ForwardError> for ApiError {
    fn from(err: ForwardError) -> Self {
        tracing::warn!(error = %err, "Upstream fetch failed");
        ApiError::UpstreamUnavailable
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
