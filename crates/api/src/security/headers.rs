//! Security Headers Middleware
//!
//! Adds hardening headers to every response. The set is tuned for a media
//! gateway: responses are embedded by a player on another origin, so there is
//! no Content-Security-Policy or Cross-Origin-Embedder-Policy and the
//! resource policy is `cross-origin`.

use axum::{
    body::Body,
    http::{HeaderValue, Request, Response},
    middleware::Next,
};

/// Middleware that adds security headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    // X-Content-Type-Options: Prevent MIME type sniffing of segments
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );

    // X-Frame-Options: Prevent clickjacking attacks
    headers.insert("X-Frame-Options", HeaderValue::from_static("SAMEORIGIN"));

    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    headers.insert(
        "Strict-Transport-Security",
        HeaderValue::from_static("max-age=15552000; includeSubDomains"),
    );

    headers.insert("X-DNS-Prefetch-Control", HeaderValue::from_static("off"));

    headers.insert(
        "X-Permitted-Cross-Domain-Policies",
        HeaderValue::from_static("none"),
    );

    headers.insert(
        "Cross-Origin-Opener-Policy",
        HeaderValue::from_static("same-origin"),
    );

    // Players on other origins must be able to load media
    headers.insert(
        "Cross-Origin-Resource-Policy",
        HeaderValue::from_static("cross-origin"),
    );

    // Cache-Control: streaming handlers set their own window
    if !headers.contains_key("Cache-Control") {
        headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    }

    response
}
