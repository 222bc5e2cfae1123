//! Streaming and image proxy routes

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, Uri},
    response::Response,
};

use mediaveil_shared::{ResolvedTarget, RouteKind};

use crate::{
    error::ApiResult,
    routing::{resolve_target, TargetRequest},
    state::AppState,
};

/// GET /stream/:token and /stream/:token/
pub async fn stream(
    State(state): State<AppState>,
    Path(token): Path<String>,
    method: Method,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let request = TargetRequest {
        token: &token,
        route: RouteKind::Stream,
        sub_path: None,
        query: None,
    };
    proxy(&state, request, &method, &headers).await
}

/// GET /stream/:token/*sub_path
///
/// The sub-path is taken from the raw request URI rather than the decoded
/// `Path` capture, so `%3F`, `%23` and friends stay part of the segment name
/// when resolved against the origin.
pub async fn stream_sub_path(
    State(state): State<AppState>,
    Path((token, _)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let request = TargetRequest {
        token: &token,
        route: RouteKind::Stream,
        sub_path: raw_sub_path(uri.path()),
        query: uri.query(),
    };
    proxy(&state, request, &method, &headers).await
}

/// GET /image/:token
pub async fn image(
    State(state): State<AppState>,
    Path(token): Path<String>,
    method: Method,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let request = TargetRequest {
        token: &token,
        route: RouteKind::Image,
        sub_path: None,
        query: None,
    };
    proxy(&state, request, &method, &headers).await
}

/// Everything after `/stream/{token}/`, still percent-encoded
fn raw_sub_path(path: &str) -> Option<&str> {
    path.strip_prefix("/stream/")?
        .split_once('/')
        .map(|(_, sub_path)| sub_path)
}

async fn proxy(
    state: &AppState,
    request: TargetRequest<'_>,
    method: &Method,
    headers: &HeaderMap,
) -> ApiResult<Response> {
    let target = resolve_target(state.registry.as_ref(), request)?;

    tracing::debug!(
        token = %request.token,
        route = ?request.route,
        sub_path = request.sub_path.unwrap_or_default(),
        "Forwarding to origin"
    );

    let mut response = state.forwarder.forward(&target.url, method, headers).await?;
    apply_policy(response.headers_mut(), &target);
    Ok(response)
}

/// Override content type (when known) and cache window on the way out
fn apply_policy(headers: &mut HeaderMap, target: &ResolvedTarget) {
    if let Some(content_type) = target.content_type {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    match HeaderValue::from_str(&target.cache_control()) {
        Ok(cache_control) => {
            headers.insert(header::CACHE_CONTROL, cache_control);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to build Cache-Control header");
        }
    }
}
