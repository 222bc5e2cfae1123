//! Common types used across MediaVeil

// =============================================================================
// Resolution
// =============================================================================

/// Which public route received the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// `/stream/:token[/*sub_path]`: video files, manifests and segments
    Stream,
    /// `/image/:token`: thumbnails and posters
    Image,
}

/// Upstream URL plus the response policy computed for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub url: String,
    /// `None` leaves the upstream `Content-Type` untouched
    pub content_type: Option<&'static str>,
    pub cache_max_age_seconds: u32,
}

impl ResolvedTarget {
    /// `Cache-Control` header value for this target
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age_seconds)
    }
}
