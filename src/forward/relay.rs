//! Relaying an upstream response back to the caller.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::forward::client::UpstreamResponse;
use crate::forward::outbound::DEFAULT_MEDIA_TYPE;

/// What the caller receives for a successful outbound call.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub content_disposition: Option<HeaderValue>,
    pub body: Bytes,
}

impl RelayResponse {
    /// Mirror status, content-type (defaulting to JSON), content-disposition
    /// and body from the upstream.
    pub fn from_upstream(upstream: UpstreamResponse) -> Self {
        let content_type = upstream
            .headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_MEDIA_TYPE));
        let content_disposition = upstream.headers.get(header::CONTENT_DISPOSITION).cloned();

        Self {
            status: upstream.status,
            content_type,
            content_disposition,
            body: upstream.body,
        }
    }

    /// Drop the content-disposition, for relays that only mirror
    /// status, content-type and body.
    pub fn without_content_disposition(mut self) -> Self {
        self.content_disposition = None;
        self
    }
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, self.content_type);
        if let Some(disposition) = self.content_disposition {
            headers.insert(header::CONTENT_DISPOSITION, disposition);
        }

        response
    }
}
