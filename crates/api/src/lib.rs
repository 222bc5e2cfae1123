//! MediaVeil API Library
//!
//! This crate contains the HTTP gateway that hides media origins behind
//! opaque tokens and streams their content to players.

pub mod auth;
pub mod config;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod routing;
pub mod security;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routing::{OriginRegistry, OriginStore, RegistryPolicy};
pub use state::AppState;
