//! Shared application state handed to every handler

use std::sync::Arc;

use mediaveil_shared::TokenGenerator;

use crate::auth::InternalApiKey;
use crate::config::Config;
use crate::proxy::{ForwardError, StreamingForwarder};
use crate::routing::{OriginRegistry, OriginStore, RegistryPolicy};

/// Application state, cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<dyn OriginStore>,
    pub tokens: TokenGenerator,
    pub api_key: InternalApiKey,
    pub forwarder: StreamingForwarder,
}

impl AppState {
    /// Build state with an in-memory registry using the configured policy
    pub fn new(config: Config) -> Result<Self, ForwardError> {
        let registry = Arc::new(OriginRegistry::with_policy(RegistryPolicy {
            max_entries: config.registry_max_entries,
            ttl: config.registry_ttl,
        }));
        Self::with_registry(config, registry)
    }

    /// Build state around an existing registry
    pub fn with_registry(
        config: Config,
        registry: Arc<dyn OriginStore>,
    ) -> Result<Self, ForwardError> {
        let forwarder = StreamingForwarder::new(config.upstream_timeout)?;
        Ok(Self {
            tokens: TokenGenerator::new(config.url_encryption_key.clone()),
            api_key: InternalApiKey::new(config.internal_api_key.as_deref()),
            forwarder,
            registry,
            config: Arc::new(config),
        })
    }
}
