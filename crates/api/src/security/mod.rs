//! Response hardening and cross-origin policy

mod cors;
mod headers;

pub use cors::cors_layer;
pub use headers::security_headers_middleware;
