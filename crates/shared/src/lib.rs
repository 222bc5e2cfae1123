//! MediaVeil Shared Types and Utilities
//!
//! This crate contains the I/O-free pieces of the gateway: token hashing,
//! relative path resolution, content policy and the shared data model.

pub mod content;
pub mod error;
pub mod path;
pub mod token;
pub mod types;

pub use content::{classify, CachePolicy, MANIFEST_MAX_AGE_SECS, IMAGE_MAX_AGE_SECS};
pub use error::*;
pub use path::resolve;
pub use token::{generate_token, TokenGenerator, TOKEN_LEN};
pub use types::*;
