//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, body limit, deadline)
//! - Bind server to listener
//! - Dispatch generic forwards and GitHub relay calls
//! - Observability (metrics, correlation IDs)

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, RawQuery, State},
    http::{HeaderMap, HeaderValue, Method, Request},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{CorsConfig, GatewayConfig};
use crate::forward::{Forwarder, GatewayError, InboundRequest, UpstreamClient};
use crate::github::{self, GithubClient};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::ExternalFailure;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub github: Arc<GithubClient>,
}

/// HTTP server for the forwarding gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let forwarder = Arc::new(Forwarder::new(upstream.clone()));
        let github = Arc::new(GithubClient::new(&config.github, upstream)?);

        if !github.has_credential() {
            tracing::warn!("GitHub token not configured; GitHub relay calls will return 502");
        }

        let state = AppState { forwarder, github };
        let router = Self::build_router(&config, state);

        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/health", get(health_handler))
            .route("/api/external", any(external_handler))
            .merge(github::routes())
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer(&config.cors))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request.request_id(),
                    method = %request.method(),
                    path = %request.uri().path()
                )
            }))
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Generic forwarder: `ANY /api/external?target_url=...`.
async fn external_handler(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let request_id = headers.request_id().to_string();

    let inbound = InboundRequest {
        method: method.clone(),
        query: InboundRequest::parse_query(query.as_deref()),
        headers,
        body,
    };

    match state.forwarder.forward(&inbound).await {
        Ok(relay) => {
            metrics::record_relay("external", &method, relay.status.as_u16(), start);
            relay.into_response()
        }
        Err(err) => {
            let failure = ExternalFailure(err);
            if failure.0.is_client_error() {
                tracing::debug!(request_id = %request_id, error = %failure.0, "Rejected forward request");
            } else {
                tracing::warn!(request_id = %request_id, error = %failure.0.detail(), "Upstream fetch failed");
            }
            metrics::record_relay("external", &method, failure.status().as_u16(), start);
            failure.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;

    fn router(config: GatewayConfig) -> Router {
        HttpServer::new(config).unwrap().into_router()
    }

    #[tokio::test]
    async fn health_reports_version() {
        let response = router(GatewayConfig::default())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn missing_target_is_400() {
        let response = router(GatewayConfig::default())
            .oneshot(Request::get("/api/external?page=1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut config = GatewayConfig::default();
        config.limits.max_body_bytes = 16;

        let response = router(config)
            .oneshot(
                Request::post("/api/external?target_url=http%3A%2F%2F127.0.0.1%3A9%2F")
                    .header(header::CONTENT_TYPE, "application/octet-stream")
                    .body(Body::from(vec![7u8; 64]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn caller_request_id_is_echoed() {
        let response = router(GatewayConfig::default())
            .oneshot(
                Request::get("/api/health")
                    .header("x-request-id", "caller-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "caller-42");
    }

    #[tokio::test]
    async fn cors_allows_configured_origin_only() {
        let mut config = GatewayConfig::default();
        config.cors.allowed_origins = vec!["https://app.example.com".into()];
        let app = router(config);

        let preflight = |origin: &'static str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/external")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap()
        };

        let allowed = app.clone().oneshot(preflight("https://app.example.com")).await.unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );

        let denied = app.oneshot(preflight("https://evil.example.com")).await.unwrap();
        assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
