//! Streaming forwarder for upstream origins
//!
//! Issues the outbound request for a resolved target and hands the upstream
//! body back as a stream. The body is pulled chunk by chunk as the client
//! consumes it; when the client goes away the response is dropped and the
//! upstream connection with it.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, StatusCode},
    response::Response,
};
use futures::TryStreamExt;
use reqwest::Client;

/// Default timeout for connecting, receiving headers and each body read (60 seconds)
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Hop-by-hop headers never copied in either direction
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Inbound headers that belong to the gateway, not the origin
const GATEWAY_ONLY: &[&str] = &[
    "host",
    "content-length",
    "x-api-key",
    "cookie",
    "authorization",
];

/// Error type for forwarding operations
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timeout waiting for upstream response")]
    Timeout,

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Failed to build response: {0}")]
    Response(String),
}

/// Forwards requests to origins and streams the responses back
#[derive(Clone)]
pub struct StreamingForwarder {
    client: Client,
    timeout: Duration,
}

impl StreamingForwarder {
    /// Create a forwarder with the given connect/response/read timeout
    pub fn new(timeout: Duration) -> Result<Self, ForwardError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Fetch `target_url` and stream it back.
    ///
    /// Only `GET` and `HEAD` are forwarded as themselves; any other inbound
    /// method is fetched with `GET`. The response keeps the upstream status
    /// and end-to-end headers. Connection failures, timeouts and upstream
    /// statuses other than 2xx/304 are returned as errors before anything
    /// is written to the client.
    pub async fn forward(
        &self,
        target_url: &str,
        method: &Method,
        inbound_headers: &HeaderMap,
    ) -> Result<Response, ForwardError> {
        let method = if *method == Method::HEAD {
            Method::HEAD
        } else {
            Method::GET
        };

        let request = self
            .client
            .request(method, target_url)
            .headers(forwardable_headers(inbound_headers));

        let upstream = match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => return Err(ForwardError::Timeout),
            Ok(Err(e)) => return Err(ForwardError::Http(e)),
            Err(_) => return Err(ForwardError::Timeout),
        };

        let status = upstream.status();
        if !status.is_success() && status != StatusCode::NOT_MODIFIED {
            return Err(ForwardError::Status(status.as_u16()));
        }

        let mut builder = Response::builder().status(status);
        if let Some(headers) = builder.headers_mut() {
            copy_response_headers(upstream.headers(), headers);
        }

        let upstream_host = upstream.url().host_str().unwrap_or_default().to_string();
        let stream = upstream.bytes_stream().map_err(move |e| {
            // Headers are already out; the client sees a truncated body
            tracing::warn!(upstream_host = %upstream_host, error = %e, "Upstream body stream failed");
            e
        });

        builder
            .body(Body::from_stream(stream))
            .map_err(|e| ForwardError::Response(e.to_string()))
    }
}

/// Inbound headers to pass through to the origin.
///
/// `Host` is dropped so the client sets it from the target URL.
fn forwardable_headers(inbound: &HeaderMap) -> HeaderMap {
    let connection_listed = connection_tokens(inbound);

    inbound
        .iter()
        .filter(|(name, _)| {
            let name = name.as_str();
            !HOP_BY_HOP.contains(&name)
                && !GATEWAY_ONLY.contains(&name)
                && !connection_listed.iter().any(|listed| listed == name)
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn copy_response_headers(upstream: &HeaderMap, out: &mut HeaderMap) {
    let connection_listed = connection_tokens(upstream);

    for (name, value) in upstream {
        let name_str = name.as_str();
        if HOP_BY_HOP.contains(&name_str)
            || name_str == "set-cookie"
            // CORS is decided by the gateway, not the origin
            || name_str.starts_with("access-control-")
            || connection_listed.iter().any(|listed| listed == name_str)
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
}

/// Header names listed in a `Connection` header, lowercased
fn connection_tokens(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}
