//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, SecretToken};
use crate::config::validation::{validate_config, ValidationError};

/// Listening port override.
pub const ENV_PORT: &str = "PORT";
/// Comma-separated allowed origins override.
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
/// GitHub relay credential.
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {name}: {reason}")]
    Env { name: &'static str, reason: String },

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

/// Load configuration from an optional TOML file, apply environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto `config`.
///
/// `lookup` abstracts the environment so the rules can be exercised without
/// touching process-global state.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup(ENV_PORT) {
        config.listener.port = port.trim().parse().map_err(|e| ConfigError::Env {
            name: ENV_PORT,
            reason: format!("'{}': {}", port, e),
        })?;
    }

    if let Some(origins) = lookup(ENV_ALLOWED_ORIGINS) {
        let origins: Vec<String> = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
        if !origins.is_empty() {
            config.cors.allowed_origins = origins;
        }
    }

    if let Some(token) = lookup(ENV_GITHUB_TOKEN) {
        let token = token.trim();
        if !token.is_empty() {
            config.github.token = Some(SecretToken::new(token));
        }
    }

    Ok(())
}
