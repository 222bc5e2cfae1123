//! Error types for MediaVeil

use thiserror::Error;

/// Token generation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("URL hashing secret is not configured")]
    MissingSecret,

    #[error("Origin URL must not be empty")]
    EmptyOrigin,
}

/// Failures while resolving a request path against a registered origin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Registered origin is not a valid URL: {0}")]
    InvalidOrigin(String),

    #[error("Sub-path could not be resolved: {0}")]
    InvalidReference(String),

    #[error("Sub-path resolves outside the registered origin")]
    CrossOrigin,
}
