//! GitHub relay subsystem.
//!
//! # Data Flow
//! ```text
//! /api/github/repos/{owner}/{repo}/issues[/{number}]
//!     → handlers.rs (extract path, query, body)
//!     → client.rs (credentialed_fetch: token check, injected headers)
//!     → forward::client (single bounded call)
//!     → RelayResponse (status / content-type / body)
//! ```
//!
//! # Design Decisions
//! - The token lives only in server config and the outbound Authorization header
//! - A missing token fails the relay call, never the process
//! - Every failure becomes 502 `{"error": ...}`; nothing is retried

pub mod client;
pub mod handlers;

use axum::{routing::get, Router};

use crate::http::server::AppState;

pub use client::{FetchOptions, GithubClient};

/// Routes served under `/api/github`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/github/repos/{owner}/{repo}/issues",
            get(handlers::list_issues).post(handlers::create_issue),
        )
        .route(
            "/api/github/repos/{owner}/{repo}/issues/{number}",
            get(handlers::get_issue).patch(handlers::update_issue),
        )
}
