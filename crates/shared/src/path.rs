//! Resolution of manifest-relative request paths
//!
//! Players fetch the segments and variant playlists a manifest references
//! relative to the manifest's own URL. Behind the gateway that URL is
//! `/stream/{token}/`, so a reference such as `seg1.ts` arrives as the
//! sub-path of `/stream/{token}/seg1.ts` and has to be resolved against the
//! registered origin the same way the player would have resolved it against
//! the real manifest location.
//!
//! Resolution follows RFC 3986 (via [`url::Url::join`]): `seg1.ts` replaces
//! the last path segment, `../x.ts` walks up, `/x.ts` is host-absolute and a
//! `?query` in the reference is kept. References that leave the origin's
//! scheme, host and port are rejected.

use url::Url;

use crate::error::ResolveError;

/// Compute the upstream URL for a request.
///
/// With no sub-path (or an empty one) the registered origin is returned
/// verbatim, query string included.
pub fn resolve(origin_url: &str, sub_path: Option<&str>) -> Result<String, ResolveError> {
    let reference = match sub_path {
        Some(reference) if !reference.is_empty() => reference,
        _ => return Ok(origin_url.to_string()),
    };

    let base = Url::parse(origin_url).map_err(|e| ResolveError::InvalidOrigin(e.to_string()))?;
    let joined = base
        .join(reference)
        .map_err(|e| ResolveError::InvalidReference(e.to_string()))?;

    if !same_origin(&base, &joined) {
        return Err(ResolveError::CrossOrigin);
    }

    Ok(joined.into())
}

/// Build the reference handed to [`resolve`] from a sub-path and the inbound
/// query string.
///
/// Manifests often carry per-segment signatures (`seg1.ts?sig=...`); the
/// player sends those as the request's query, so they are re-attached here.
pub fn reference(sub_path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{sub_path}?{query}"),
        _ => sub_path.to_string(),
    }
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}
