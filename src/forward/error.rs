//! Gateway error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that can occur while deriving or performing an outbound call.
///
/// A non-2xx upstream status is not an error: it is relayed as-is.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The caller did not supply `target_url`.
    #[error("Missing target_url query parameter")]
    MissingTarget,

    /// `target_url` is not an absolute http(s) URL.
    #[error("Invalid target_url '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    /// No response could be obtained from the upstream.
    #[error("{0}")]
    UpstreamFetch(#[source] reqwest::Error),

    /// The relay needs a server-held credential that is not configured.
    #[error("GitHub token is not configured")]
    MissingCredential,

    /// An outbound URL or header could not be assembled.
    #[error("Invalid outbound request: {0}")]
    InvalidOutbound(String),

    /// The HTTP client could not be constructed at startup.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl GatewayError {
    /// Status reported to the caller for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingTarget | GatewayError::InvalidTarget { .. } => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::UpstreamFetch(_)
            | GatewayError::MissingCredential
            | GatewayError::InvalidOutbound(_) => StatusCode::BAD_GATEWAY,
            GatewayError::ClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for errors caused by the caller's request rather than the upstream.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Human-readable description including the transport cause, if any.
    pub fn detail(&self) -> String {
        match self {
            GatewayError::UpstreamFetch(e) => describe_reqwest_error(e),
            other => other.to_string(),
        }
    }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    let kind = if e.is_timeout() {
        "timed out"
    } else if e.is_connect() {
        "connection failed"
    } else if e.is_redirect() {
        "redirect error"
    } else if e.is_body() || e.is_decode() {
        "response body error"
    } else {
        "request failed"
    };

    let mut detail = format!("{}: {}", kind, e);
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}
