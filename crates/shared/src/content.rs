//! Content-type and cache policy for resolved upstream URLs
//!
//! A closed table keyed by file extension; anything not listed keeps the
//! upstream `Content-Type`. Adding a format means adding a row.

use url::Url;

use crate::types::{ResolvedTarget, RouteKind};

/// Cache window for manifests, segments and videos (1 hour)
pub const MANIFEST_MAX_AGE_SECS: u32 = 3600;

/// Cache window for the image route (24 hours)
pub const IMAGE_MAX_AGE_SECS: u32 = 86_400;

/// Extensions whose content type the gateway sets itself on the stream route
const STREAM_CONTENT_TYPES: &[(&str, &str)] = &[
    ("m3u8", "application/vnd.apple.mpegurl"),
    ("mpd", "application/dash+xml"),
];

/// Outcome of [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub content_type: Option<&'static str>,
    pub max_age_seconds: u32,
}

impl CachePolicy {
    /// Attach this policy to a resolved URL
    pub fn into_target(self, url: String) -> ResolvedTarget {
        ResolvedTarget {
            url,
            content_type: self.content_type,
            cache_max_age_seconds: self.max_age_seconds,
        }
    }
}

/// Classify a resolved upstream URL for the route that received it.
pub fn classify(target_url: &str, route: RouteKind) -> CachePolicy {
    match route {
        RouteKind::Image => CachePolicy {
            content_type: None,
            max_age_seconds: IMAGE_MAX_AGE_SECS,
        },
        RouteKind::Stream => {
            let content_type = extension(target_url).and_then(|ext| {
                STREAM_CONTENT_TYPES
                    .iter()
                    .find(|(known, _)| known.eq_ignore_ascii_case(&ext))
                    .map(|(_, content_type)| *content_type)
            });
            CachePolicy {
                content_type,
                max_age_seconds: MANIFEST_MAX_AGE_SECS,
            }
        }
    }
}

/// Suffix after the last `.` of the final path segment, ignoring query and
/// fragment.
fn extension(target_url: &str) -> Option<String> {
    let path = match Url::parse(target_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => target_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_string())
}
