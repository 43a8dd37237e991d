//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check that URLs and origins are usable before the server starts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("timeouts.request_secs ({request_secs}) must be at least upstream.timeout_secs ({upstream_secs})")]
    DeadlineShorterThanUpstream { request_secs: u64, upstream_secs: u64 },

    #[error("cors.allowed_origins must list at least one origin")]
    NoOrigins,

    #[error("invalid origin '{0}'")]
    InvalidOrigin(String),

    #[error("github.api_base '{0}' is not an absolute http(s) URL")]
    InvalidApiBase(String),

    #[error("github.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "upstream.connect_timeout_secs" });
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "upstream.timeout_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    } else if config.timeouts.request_secs < config.upstream.timeout_secs {
        errors.push(ValidationError::DeadlineShorterThanUpstream {
            request_secs: config.timeouts.request_secs,
            upstream_secs: config.upstream.timeout_secs,
        });
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_body_bytes" });
    }

    if config.cors.allowed_origins.is_empty() {
        errors.push(ValidationError::NoOrigins);
    }
    for origin in &config.cors.allowed_origins {
        if !is_valid_origin(origin) {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    match Url::parse(&config.github.api_base) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidApiBase(config.github.api_base.clone())),
    }
    if config.github.user_agent.trim().is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_valid_origin(origin: &str) -> bool {
    if origin == "*" {
        return true;
    }
    let parsed = match Url::parse(origin) {
        Ok(url) => url,
        Err(_) => return false,
    };
    parsed.has_host() && HeaderValue::from_str(origin).is_ok()
}
