//! Outbound HTTP client shared by every request family.
//!
//! # Design Decisions
//! - One `reqwest::Client` per process; its connection pool is an internal
//!   optimization and holds no request state
//! - Every call is bounded by the configured total timeout
//! - Redirects follow the client's default policy; nothing is retried
//! - Dropping the returned future aborts the call

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};

use crate::config::UpstreamConfig;
use crate::forward::error::GatewayError;
use crate::forward::outbound::OutboundRequest;

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Thin wrapper around `reqwest::Client` that executes `OutboundRequest`s.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    inner: reqwest::Client,
}

impl UpstreamClient {
    /// Build the client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs));
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }

        let inner = builder.build().map_err(GatewayError::ClientBuild)?;
        Ok(Self { inner })
    }

    /// Perform one outbound call and buffer the whole response.
    ///
    /// Any transport failure, including one while reading the body, is an
    /// `UpstreamFetch` error. Upstream status codes are returned untouched.
    pub async fn execute(&self, request: OutboundRequest) -> Result<UpstreamResponse, GatewayError> {
        let OutboundRequest { method, url, headers, body } = request;

        let mut builder = self.inner.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(GatewayError::UpstreamFetch)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(GatewayError::UpstreamFetch)?;

        Ok(UpstreamResponse { status, headers, body })
    }
}
