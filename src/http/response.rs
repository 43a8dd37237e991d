//! Error responses for each request family.
//!
//! # Responsibilities
//! - Map gateway errors to HTTP status codes
//! - Render the family-specific error bodies
//!
//! # Design Decisions
//! - A missing or invalid target is the only plain-text error (400)
//! - Every other failure is machine-parseable JSON
//! - GitHub relay failures are always 502, whatever the cause

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::forward::error::GatewayError;

/// Body of a failed generic forward.
#[derive(Debug, Serialize)]
pub struct UpstreamFailureBody {
    pub error: &'static str,
    pub detail: String,
}

/// Body of a failed GitHub relay call.
#[derive(Debug, Serialize)]
pub struct RelayFailureBody {
    pub error: String,
}

/// Failure of the generic external forwarder.
#[derive(Debug)]
pub struct ExternalFailure(pub GatewayError);

impl ExternalFailure {
    pub fn status(&self) -> StatusCode {
        self.0.status_code()
    }
}

impl IntoResponse for ExternalFailure {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            return (status, self.0.to_string()).into_response();
        }

        let body = UpstreamFailureBody {
            error: "Upstream fetch failed",
            detail: self.0.detail(),
        };
        (status, Json(body)).into_response()
    }
}

/// Failure of a GitHub relay operation.
#[derive(Debug)]
pub struct GithubFailure(pub GatewayError);

impl GithubFailure {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }
}

impl IntoResponse for GithubFailure {
    fn into_response(self) -> Response {
        let body = RelayFailureBody { error: self.0.detail() };
        (self.status(), Json(body)).into_response()
    }
}
