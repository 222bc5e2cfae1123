//! Opaque token generation for origin URLs
//!
//! A token is the first [`TOKEN_LEN`] hex characters of
//! `SHA-256(origin_url ++ secret)`. The same `(origin_url, secret)` pair
//! always produces the same token, so registering a URL twice is a no-op and
//! tokens survive restarts as long as the secret does. Rotating the secret
//! invalidates every token issued before.
//!
//! Truncation to 64 bits keeps tokens short and URL-safe at the cost of
//! global uniqueness: two origins may collide, in which case the registry
//! keeps the last one written.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::TokenError;

/// Number of hex characters kept from the digest
pub const TOKEN_LEN: usize = 16;

/// Hash an origin URL into its token.
pub fn generate_token(origin_url: &str, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    if origin_url.is_empty() {
        return Err(TokenError::EmptyOrigin);
    }

    let mut hasher = Sha256::new();
    hasher.update(origin_url.as_bytes());
    hasher.update(secret.as_bytes());
    let mut token = hex::encode(hasher.finalize());
    token.truncate(TOKEN_LEN);
    Ok(token)
}

/// Token generator bound to the process-wide secret.
///
/// The secret is optional so that a development process can start without
/// one; every call to [`TokenGenerator::generate`] then fails with
/// [`TokenError::MissingSecret`].
#[derive(Clone)]
pub struct TokenGenerator {
    secret: Option<String>,
}

impl TokenGenerator {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Whether a secret is available
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn generate(&self, origin_url: &str) -> Result<String, TokenError> {
        let secret = self.secret.as_deref().ok_or(TokenError::MissingSecret)?;
        generate_token(origin_url, secret)
    }
}

impl fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-url-secret-must-be-at-least-32-chars";

    #[test]
    fn test_token_is_deterministic() {
        let url = "https://cdn.example/path/master.m3u8";
        let first = generate_token(url, SECRET).unwrap();
        for _ in 0..10 {
            assert_eq!(generate_token(url, SECRET).unwrap(), first);
        }
    }

    #[test]
    fn test_token_shape() {
        let token = generate_token("https://cdn.example/a/b/video.mp4", SECRET).unwrap();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_token_matches_truncated_sha256() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223...
        let token = generate_token("ab", "c").unwrap();
        assert_eq!(token, "ba7816bf8f01cfea");
    }

    #[test]
    fn test_secret_changes_token() {
        let url = "https://cdn.example/path/master.m3u8";
        let a = generate_token(url, SECRET).unwrap();
        let b = generate_token(url, "another-secret-entirely-different").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_distinct_urls_get_distinct_tokens() {
        let a = generate_token("https://cdn.example/one.mp4", SECRET).unwrap();
        let b = generate_token("https://cdn.example/two.mp4", SECRET).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_secret() {
        assert_eq!(
            generate_token("https://cdn.example/v.mp4", ""),
            Err(TokenError::MissingSecret)
        );

        let generator = TokenGenerator::new(None);
        assert!(!generator.is_configured());
        assert_eq!(
            generator.generate("https://cdn.example/v.mp4"),
            Err(TokenError::MissingSecret)
        );

        // An empty secret from the environment counts as unset
        assert!(!TokenGenerator::new(Some(String::new())).is_configured());
    }

    #[test]
    fn test_empty_origin_rejected() {
        assert_eq!(generate_token("", SECRET), Err(TokenError::EmptyOrigin));
    }

    #[test]
    fn test_generator_matches_free_function() {
        let generator = TokenGenerator::new(Some(SECRET.to_string()));
        let url = "https://cdn.example/img/poster.jpg";
        assert_eq!(
            generator.generate(url).unwrap(),
            generate_token(url, SECRET).unwrap()
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let generator = TokenGenerator::new(Some(SECRET.to_string()));
        let debug = format!("{:?}", generator);
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("<redacted>"));
    }
}
