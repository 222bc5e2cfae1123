//! Internal API key validation
//!
//! Registration is only open to the player service, which proves itself with
//! the shared `INTERNAL_API_KEY` in the `x-api-key` header.

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

use crate::error::ApiError;

/// Header carrying the internal key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Validator for the shared internal API key
#[derive(Clone)]
pub struct InternalApiKey {
    key: Option<Vec<u8>>,
}

impl InternalApiKey {
    /// Create a validator; `None` or an empty key leaves registration closed
    pub fn new(key: Option<&str>) -> Self {
        Self {
            key: key
                .filter(|k| !k.is_empty())
                .map(|k| k.as_bytes().to_vec()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    /// Check the `x-api-key` header of a request
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let expected = self
            .key
            .as_deref()
            .ok_or(ApiError::Configuration("INTERNAL_API_KEY is not set"))?;

        let provided = headers
            .get(API_KEY_HEADER)
            .map(|value| value.as_bytes())
            .ok_or(ApiError::Unauthorized)?;

        if constant_time_compare(provided, expected) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

impl std::fmt::Debug for InternalApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalApiKey")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    // Even when lengths differ, we do constant-time work to avoid leaking length
    if a.len() != b.len() {
        let dummy = vec![0u8; a.len()];
        let _ = a.ct_eq(&dummy);
        return false;
    }

    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(key).unwrap());
        headers
    }

    #[test]
    fn test_matching_key_accepted() {
        let validator = InternalApiKey::new(Some("player-service-key"));
        assert!(validator.verify(&headers_with("player-service-key")).is_ok());
    }

    #[test]
    fn test_mismatched_key_rejected() {
        let validator = InternalApiKey::new(Some("player-service-key"));

        for key in ["player-service-kex", "player-service-key-extra", "short", ""] {
            assert!(
                matches!(validator.verify(&headers_with(key)), Err(ApiError::Unauthorized)),
                "{key}"
            );
        }
    }

    #[test]
    fn test_missing_header_rejected() {
        let validator = InternalApiKey::new(Some("player-service-key"));
        assert!(matches!(
            validator.verify(&HeaderMap::new()),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn test_unconfigured_key_is_configuration_error() {
        for validator in [InternalApiKey::new(None), InternalApiKey::new(Some(""))] {
            assert!(!validator.is_configured());
            assert!(matches!(
                validator.verify(&headers_with("anything")),
                Err(ApiError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare(b"abc", b"abc"));
        assert!(!constant_time_compare(b"abc", b"abd"));
        assert!(!constant_time_compare(b"abc", b"abcd"));
    }
}
