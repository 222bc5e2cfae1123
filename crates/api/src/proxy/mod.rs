//! Upstream proxying
//!
//! ```text
//! Player --> /stream/{token}/seg1.ts --> MediaVeil --> https://cdn/path/seg1.ts
//! ```

pub mod forwarder;

pub use forwarder::{ForwardError, StreamingForwarder, DEFAULT_UPSTREAM_TIMEOUT};
