//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (method, query, headers, body)
//!     → overlay.rs (header_* query keys → outbound headers)
//!     → outbound.rs (target_url, query merge, body rules → OutboundRequest)
//!     → client.rs (single bounded outbound call, fully buffered)
//!     → relay.rs (status / content-type / content-disposition / body)
//!     → Caller
//! ```
//!
//! # Design Decisions
//! - Translation is pure and testable without a network
//! - No retries, no partial responses: a call is relayed whole or fails
//! - Upstream non-2xx statuses are relayed, never treated as errors

pub mod client;
pub mod error;
pub mod external;
pub mod outbound;
pub mod overlay;
pub mod relay;

pub use client::{UpstreamClient, UpstreamResponse};
pub use error::GatewayError;
pub use external::Forwarder;
pub use outbound::{InboundRequest, OutboundRequest};
pub use overlay::header_overlay;
pub use relay::RelayResponse;
