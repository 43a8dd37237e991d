//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (PORT / ALLOWED_ORIGINS / GITHUB_TOKEN overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no runtime reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, GatewayConfig, GithubConfig, LimitsConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, SecretToken, TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
