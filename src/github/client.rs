//! Credentialed client for the GitHub REST API.
//!
//! # Responsibilities
//! - Hold the server-side token; callers never supply or see it
//! - Inject User-Agent, Accept and Authorization on every call
//! - Fail fast, before any network activity, when no token is configured
//! - Build issue endpoints from percent-encoded path segments

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use url::Url;

use crate::config::{GithubConfig, SecretToken};
use crate::forward::client::{UpstreamClient, UpstreamResponse};
use crate::forward::error::GatewayError;
use crate::forward::outbound::{merge_query, OutboundRequest, DEFAULT_MEDIA_TYPE};
use crate::forward::relay::RelayResponse;

/// Method, extra headers, query and body for one credentialed call.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl FetchOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Attach a body with its declared content-type, defaulting to JSON.
    pub fn with_body(mut self, content_type: Option<HeaderValue>, body: Bytes) -> Self {
        let content_type =
            content_type.unwrap_or_else(|| HeaderValue::from_static(DEFAULT_MEDIA_TYPE));
        self.headers.insert(header::CONTENT_TYPE, content_type);
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// GitHub relay client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    upstream: UpstreamClient,
    api_base: Url,
    user_agent: HeaderValue,
    accept: HeaderValue,
    token: Option<SecretToken>,
}

impl GithubClient {
    pub fn new(config: &GithubConfig, upstream: UpstreamClient) -> Result<Self, GatewayError> {
        let api_base = Url::parse(&config.api_base).map_err(|e| {
            GatewayError::InvalidOutbound(format!("github api_base '{}': {}", config.api_base, e))
        })?;
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| GatewayError::InvalidOutbound(format!("github user_agent: {}", e)))?;
        let accept = HeaderValue::from_str(&config.accept)
            .map_err(|e| GatewayError::InvalidOutbound(format!("github accept: {}", e)))?;

        Ok(Self {
            upstream,
            api_base,
            user_agent,
            accept,
            token: config.token.clone(),
        })
    }

    /// Whether a credential is configured.
    pub fn has_credential(&self) -> bool {
        self.token.is_some()
    }

    /// Call `segments` under the API base with the server-held credential.
    ///
    /// The upstream status, headers and body are returned unmodified.
    pub async fn credentialed_fetch(
        &self,
        segments: &[&str],
        options: FetchOptions,
    ) -> Result<UpstreamResponse, GatewayError> {
        let token = self.token.as_ref().ok_or(GatewayError::MissingCredential)?;

        let mut url = self.endpoint(segments)?;
        let query: Vec<(&str, &str)> =
            options.query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        merge_query(&mut url, &query);

        let mut headers = options.headers;
        headers.insert(header::USER_AGENT, self.user_agent.clone());
        headers.insert(header::ACCEPT, self.accept.clone());
        headers.insert(header::AUTHORIZATION, bearer(token)?);

        tracing::debug!(method = %options.method, path = url.path(), "GitHub relay call");

        self.upstream
            .execute(OutboundRequest {
                method: options.method,
                url,
                headers,
                body: options.body,
            })
            .await
    }

    /// `GET /repos/{owner}/{repo}/issues` with the caller's filters.
    pub async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        filters: Vec<(String, String)>,
    ) -> Result<RelayResponse, GatewayError> {
        let options = FetchOptions::new(Method::GET).with_query(filters);
        self.relay(&["repos", owner, repo, "issues"], options).await
    }

    /// `POST /repos/{owner}/{repo}/issues` with the caller's body.
    pub async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        content_type: Option<HeaderValue>,
        body: Bytes,
    ) -> Result<RelayResponse, GatewayError> {
        let options = FetchOptions::new(Method::POST).with_body(content_type, body);
        self.relay(&["repos", owner, repo, "issues"], options).await
    }

    /// `GET /repos/{owner}/{repo}/issues/{number}`.
    pub async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: &str,
    ) -> Result<RelayResponse, GatewayError> {
        let options = FetchOptions::new(Method::GET);
        self.relay(&["repos", owner, repo, "issues", number], options).await
    }

    /// `PATCH /repos/{owner}/{repo}/issues/{number}` with the caller's body.
    pub async fn update_issue(
        &self,
        owner: &str,
        repo: &str,
        number: &str,
        content_type: Option<HeaderValue>,
        body: Bytes,
    ) -> Result<RelayResponse, GatewayError> {
        let options = FetchOptions::new(Method::PATCH).with_body(content_type, body);
        self.relay(&["repos", owner, repo, "issues", number], options).await
    }

    async fn relay(
        &self,
        segments: &[&str],
        options: FetchOptions,
    ) -> Result<RelayResponse, GatewayError> {
        let upstream = self.credentialed_fetch(segments, options).await?;
        Ok(RelayResponse::from_upstream(upstream).without_content_disposition())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GatewayError::InvalidOutbound(format!("'{}' cannot be a base URL", self.api_base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn bearer(token: &SecretToken) -> Result<HeaderValue, GatewayError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
        .map_err(|_| GatewayError::InvalidOutbound("token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}
