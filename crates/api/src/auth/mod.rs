//! Authentication module for MediaVeil

pub mod api_key;

pub use api_key::{InternalApiKey, API_KEY_HEADER};
