//! Forwarding gateway library.
//!
//! Relays caller-described HTTP requests to arbitrary upstreams
//! (`/api/external`) and to the GitHub REST API with a server-held token
//! (`/api/github/...`).

pub mod config;
pub mod forward;
pub mod github;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
