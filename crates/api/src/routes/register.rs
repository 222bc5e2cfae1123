//! Origin registration route
//!
//! Called by the player service to exchange a real media URL for a gateway
//! link. The link ends in `/` so that a manifest served from it resolves its
//! relative segment URIs back through `/stream/{token}/...`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::{ApiError, ApiResult},
    routing::InsertOutcome,
    state::AppState,
};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub video_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub proxy_url: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register an origin URL and return its proxy link
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<RegisterResponse>> {
    // Auth before the body so a wrong key never learns anything else
    state.api_key.verify(&headers)?;

    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let video_url = request
        .video_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Video URL required".to_string()))?;
    validate_origin_url(&video_url)?;

    let token = state.tokens.generate(&video_url)?;

    match state.registry.insert(&token, &video_url) {
        InsertOutcome::Inserted | InsertOutcome::Replaced { .. } => {
            tracing::info!(token = %token, cache_size = state.registry.len(), "Registered origin");
        }
        InsertOutcome::Unchanged => {
            tracing::debug!(token = %token, "Origin already registered");
        }
    }

    Ok(Json(RegisterResponse {
        proxy_url: proxy_url(&state.config.public_url, &token),
    }))
}

/// Public link for a token
pub fn proxy_url(public_url: &str, token: &str) -> String {
    format!("{}/stream/{}/", public_url.trim_end_matches('/'), token)
}

/// Origins must be absolute http(s) URLs with a host
fn validate_origin_url(video_url: &str) -> ApiResult<()> {
    let parsed = Url::parse(video_url)
        .map_err(|_| ApiError::Validation("Video URL must be an absolute URL".to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::Validation(
            "Video URL must use http or https".to_string(),
        ));
    }
    if parsed.host_str().is_none() {
        return Err(ApiError::Validation("Video URL must have a host".to_string()));
    }
    Ok(())
}
