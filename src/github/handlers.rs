//! axum handlers for the GitHub relay routes.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
};

use crate::forward::error::GatewayError;
use crate::forward::outbound::InboundRequest;
use crate::forward::relay::RelayResponse;
use crate::http::response::GithubFailure;
use crate::http::server::AppState;
use crate::observability::metrics;

const FAMILY: &str = "github";

pub async fn list_issues(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    let start = Instant::now();
    let filters = InboundRequest::parse_query(query.as_deref());
    let result = state.github.list_issues(&owner, &repo, filters).await;
    finish(Method::GET, result, start)
}

pub async fn create_issue(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let content_type = headers.get(header::CONTENT_TYPE).cloned();
    let result = state.github.create_issue(&owner, &repo, content_type, body).await;
    finish(Method::POST, result, start)
}

pub async fn get_issue(
    State(state): State<AppState>,
    Path((owner, repo, number)): Path<(String, String, String)>,
) -> Response {
    let start = Instant::now();
    let result = state.github.get_issue(&owner, &repo, &number).await;
    finish(Method::GET, result, start)
}

pub async fn update_issue(
    State(state): State<AppState>,
    Path((owner, repo, number)): Path<(String, String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let content_type = headers.get(header::CONTENT_TYPE).cloned();
    let result = state
        .github
        .update_issue(&owner, &repo, &number, content_type, body)
        .await;
    finish(Method::PATCH, result, start)
}

fn finish(method: Method, result: Result<RelayResponse, GatewayError>, start: Instant) -> Response {
    match result {
        Ok(relay) => {
            metrics::record_relay(FAMILY, &method, relay.status.as_u16(), start);
            relay.into_response()
        }
        Err(err) => {
            tracing::warn!(method = %method, error = %err.detail(), "GitHub relay failed");
            let failure = GithubFailure(err);
            metrics::record_relay(FAMILY, &method, failure.status().as_u16(), start);
            failure.into_response()
        }
    }
}
