//! Request target resolution
//!
//! Turns `(token, sub-path)` from an inbound request into the upstream URL
//! and response policy: registry lookup, then path resolution, then content
//! classification. Nothing here touches the network, so an unknown token is
//! rejected before any outbound fetch is attempted.

use mediaveil_shared::{classify, path, ResolvedTarget, RouteKind};

use super::registry::OriginStore;
use crate::error::{ApiError, ApiResult};

/// Inbound request coordinates after routing
#[derive(Debug, Clone, Copy)]
pub struct TargetRequest<'a> {
    pub token: &'a str,
    pub route: RouteKind,
    /// Manifest-relative path after `/stream/{token}/`
    pub sub_path: Option<&'a str>,
    /// Raw query string of the inbound request
    pub query: Option<&'a str>,
}

/// Resolve an inbound request against the registry
pub fn resolve_target(store: &dyn OriginStore, request: TargetRequest<'_>) -> ApiResult<ResolvedTarget> {
    let origin_url = store.lookup(request.token).ok_or(ApiError::NotFound)?;

    let reference = match (request.route, request.sub_path) {
        (RouteKind::Stream, Some(sub_path)) if !sub_path.is_empty() => {
            Some(path::reference(sub_path, request.query))
        }
        _ => None,
    };

    let url = path::resolve(&origin_url, reference.as_deref())?;
    Ok(classify(&url, request.route).into_target(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::OriginRegistry;

    fn registry() -> OriginRegistry {
        let registry = OriginRegistry::new();
        registry.insert("hls", "https://cdn.example/path/master.m3u8");
        registry.insert("mp4", "https://cdn.example/a/b/video.mp4?sig=abc");
        registry.insert("img", "https://img.example/posters/42.jpg");
        registry
    }

    fn stream<'a>(token: &'a str, sub_path: Option<&'a str>, query: Option<&'a str>) -> TargetRequest<'a> {
        TargetRequest {
            token,
            route: RouteKind::Stream,
            sub_path,
            query,
        }
    }

    #[test]
    fn test_unknown_token_is_not_found() {
        let result = resolve_target(&registry(), stream("missing", None, None));
        assert!(matches!(result, Err(ApiError::NotFound)));
    }

    #[test]
    fn test_manifest_itself() {
        let target = resolve_target(&registry(), stream("hls", None, None)).unwrap();
        assert_eq!(target.url, "https://cdn.example/path/master.m3u8");
        assert_eq!(target.content_type, Some("application/vnd.apple.mpegurl"));
        assert_eq!(target.cache_max_age_seconds, 3600);
    }

    #[test]
    fn test_segment_under_manifest() {
        let target = resolve_target(&registry(), stream("hls", Some("seg1.ts"), None)).unwrap();
        assert_eq!(target.url, "https://cdn.example/path/seg1.ts");
        assert_eq!(target.content_type, None);
        assert_eq!(target.cache_max_age_seconds, 3600);
    }

    #[test]
    fn test_segment_query_forwarded() {
        let target =
            resolve_target(&registry(), stream("hls", Some("seg1.ts"), Some("sig=xyz"))).unwrap();
        assert_eq!(target.url, "https://cdn.example/path/seg1.ts?sig=xyz");
    }

    #[test]
    fn test_plain_video_ignores_inbound_query() {
        let target = resolve_target(&registry(), stream("mp4", None, Some("t=30"))).unwrap();
        assert_eq!(target.url, "https://cdn.example/a/b/video.mp4?sig=abc");
    }

    #[test]
    fn test_variant_playlist_gets_manifest_type() {
        let target =
            resolve_target(&registry(), stream("hls", Some("720p/index.m3u8"), None)).unwrap();
        assert_eq!(target.url, "https://cdn.example/path/720p/index.m3u8");
        assert_eq!(target.content_type, Some("application/vnd.apple.mpegurl"));
    }

    #[test]
    fn test_cross_origin_sub_path_rejected() {
        let result = resolve_target(
            &registry(),
            stream("hls", Some("https://evil.example/x"), None),
        );
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_image_route() {
        let target = resolve_target(
            &registry(),
            TargetRequest {
                token: "img",
                route: RouteKind::Image,
                sub_path: Some("ignored.jpg"),
                query: Some("w=300"),
            },
        )
        .unwrap();
        assert_eq!(target.url, "https://img.example/posters/42.jpg");
        assert_eq!(target.content_type, None);
        assert_eq!(target.cache_max_age_seconds, 86_400);
    }
}
