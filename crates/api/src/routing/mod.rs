//! Token-based routing for the media proxy
//!
//! This module resolves the token in an incoming request path to the origin
//! it was registered for, and from there to the exact upstream URL:
//! - Plain videos and images: `/stream/{token}`, `/image/{token}`
//! - Manifests: `/stream/{token}/`
//! - Manifest-relative segments: `/stream/{token}/{relative path}`

mod registry;
mod target;

pub use registry::{InsertOutcome, OriginRegistry, OriginStore, RegistryPolicy};
pub use target::{resolve_target, TargetRequest};
