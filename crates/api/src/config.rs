//! Application configuration

use std::env;
use std::time::Duration;

use crate::proxy::DEFAULT_UPSTREAM_TIMEOUT;

/// Minimum length for secrets in production
const MIN_SECRET_LEN: usize = 32;

/// Deployment environment, from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Log output format, from `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    // Server
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub public_url: String, // base for generated proxy links
    pub cors_origins: Vec<String>,

    // Secrets
    pub url_encryption_key: Option<String>,
    pub internal_api_key: Option<String>,

    // Upstream
    pub upstream_timeout: Duration,

    // Registry
    pub registry_max_entries: Option<usize>,
    pub registry_ttl: Option<Duration>,
    pub registry_sweep_interval: Duration,

    // Logging
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            Ok("development") | Err(_) => Environment::Development,
            Ok(_) => {
                return Err(ConfigError::Invalid(
                    "APP_ENV must be 'production' or 'development'",
                ))
            }
        };

        let port: u16 = match env::var("PORT") {
            Ok(port) => port
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT must be a valid port number"))?,
            Err(_) => 3000,
        };

        let url_encryption_key = non_empty_var("URL_ENCRYPTION_KEY");
        let internal_api_key = non_empty_var("INTERNAL_API_KEY");

        if environment == Environment::Production {
            let key = url_encryption_key
                .as_deref()
                .ok_or(ConfigError::Missing("URL_ENCRYPTION_KEY"))?;
            if key.len() < MIN_SECRET_LEN {
                return Err(ConfigError::WeakSecret(
                    "URL_ENCRYPTION_KEY must be at least 32 characters",
                ));
            }
            if internal_api_key.is_none() {
                return Err(ConfigError::Missing("INTERNAL_API_KEY"));
            }
        }

        Ok(Self {
            environment,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            public_url: non_empty_var("PROXY_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            cors_origins: env::var("PLAYER_URL")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|origin| origin.trim().trim_end_matches('/').to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            url_encryption_key,
            internal_api_key,

            upstream_timeout: parse_var("UPSTREAM_TIMEOUT_SECS")?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT),

            registry_max_entries: parse_var("REGISTRY_MAX_ENTRIES")?.filter(|max| *max > 0),
            registry_ttl: parse_var("REGISTRY_TTL_SECS")?
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            registry_sweep_interval: Duration::from_secs(
                parse_var("REGISTRY_SWEEP_SECS")?
                    .filter(|secs| *secs > 0)
                    .unwrap_or(300),
            ),

            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }

    /// Socket address string to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    /// Development settings with no secrets configured
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_url: "http://localhost:3000".to_string(),
            cors_origins: Vec::new(),
            url_encryption_key: None,
            internal_api_key: None,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            registry_max_entries: None,
            registry_ttl: None,
            registry_sweep_interval: Duration::from_secs(300),
            log_format: LogFormat::Pretty,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("bind_address", &self.bind_address())
            .field("public_url", &self.public_url)
            .field("cors_origins", &self.cors_origins)
            .field("url_encryption_key", &self.url_encryption_key.is_some())
            .field("internal_api_key", &self.internal_api_key.is_some())
            .field("upstream_timeout", &self.upstream_timeout)
            .field("registry_max_entries", &self.registry_max_entries)
            .field("registry_ttl", &self.registry_ttl)
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty_var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::NotANumber(name)),
        None => Ok(None),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("Environment variable {0} must be a non-negative integer")]
    NotANumber(&'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
}
