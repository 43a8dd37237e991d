//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_relay_requests_total` (counter): relayed calls by family, method, status
//! - `gateway_relay_duration_seconds` (histogram): end-to-end latency by family
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exposition is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one relayed call, successful or not.
pub fn record_relay(family: &'static str, method: &Method, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_relay_requests_total",
        "family" => family,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("gateway_relay_duration_seconds", "family" => family)
        .record(start.elapsed().as_secs_f64());
}
