//! Configuration loading from disk and the process environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the remote API base URL.
pub const BASE_URL_ENV: &str = "BASE_URL";
/// Environment variable overriding the listener port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required value was not supplied by any source.
    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, merge and validate configuration.
///
/// Precedence: defaults, then the TOML file at `path` (if any), then the
/// process environment, then `bind` from the command line.
pub fn load_config(
    path: Option<&Path>,
    bind: Option<&str>,
) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    finalize(config, bind, |name| std::env::var(name).ok())
}

/// Apply environment overrides from `lookup` and the `bind` override, then
/// require and validate.
pub fn finalize<F>(
    mut config: GatewayConfig,
    bind: Option<&str>,
    lookup: F,
) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    apply_env_overrides(&mut config, &lookup)?;
    if let Some(bind) = bind {
        config.listener.bind_address = bind.to_string();
    }

    if config.portainer.base_url.is_none() {
        return Err(ConfigError::MissingEnv(BASE_URL_ENV));
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
        config.portainer.base_url = Some(base_url);
    }

    if let Some(port) = lookup(PORT_ENV) {
        let port: u16 = port.parse().map_err(|_| ConfigError::InvalidEnv {
            name: PORT_ENV,
            value: port.clone(),
        })?;
        let mut addr: SocketAddr = config
            .listener
            .bind_address
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }

    if let Some(level) = lookup(LOG_LEVEL_ENV) {
        config.observability.log_level = level;
    }

    Ok(())
}

/// Read the base URL straight from the process environment.
///
/// Used by callers that construct a client without a loaded config.
pub fn base_url_from_env() -> Result<Url, ConfigError> {
    let raw = std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingEnv(BASE_URL_ENV))?;
    parse_base_url(&raw)
}

/// Parse a base URL, reporting failures against `BASE_URL`.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|_| ConfigError::InvalidEnv {
        name: BASE_URL_ENV,
        value: raw.to_string(),
    })
}

impl GatewayConfig {
    /// The validated remote base URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .portainer
            .base_url
            .as_deref()
            .ok_or(ConfigError::MissingEnv(BASE_URL_ENV))?;
        parse_base_url(raw)
    }
}
