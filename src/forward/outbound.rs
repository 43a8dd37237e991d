//! Derivation of the outbound request from an inbound one.
//!
//! # Rules
//! - `target_url` names the upstream; the last occurrence wins
//! - Query: the target's own query, then every other inbound parameter
//!   applied with "set" semantics (replaces the first existing occurrence,
//!   drops the rest, appends new keys in inbound order)
//! - Headers: the header overlay, `accept` defaulting to `application/json`,
//!   then the inbound content-type for body-bearing methods
//! - Body: inbound bytes for body-bearing methods when non-empty

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use url::Url;

use crate::forward::error::GatewayError;
use crate::forward::overlay::{header_overlay, is_overlay_key};

/// Query parameter naming the upstream.
pub const TARGET_URL_PARAM: &str = "target_url";

/// Media type used when the caller or upstream leaves one unspecified.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// The parts of an inbound request the gateway reads.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Decoded query pairs in the order they appeared.
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundRequest {
    /// Decode a raw query string into ordered pairs.
    pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
        raw.map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }

    /// Inbound content-type, if declared and representable.
    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.headers.get(header::CONTENT_TYPE)
    }
}

/// A fully derived outbound call.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    /// Derive the outbound request for the generic forwarder.
    ///
    /// Fails with a client error before any network activity when the target
    /// is missing or unusable.
    pub fn from_inbound(inbound: &InboundRequest) -> Result<Self, GatewayError> {
        let raw_target = inbound
            .query
            .iter()
            .rev()
            .find(|(k, _)| k == TARGET_URL_PARAM)
            .map(|(_, v)| v.as_str())
            .ok_or(GatewayError::MissingTarget)?;

        let mut url = parse_target(raw_target)?;

        let forwarded: Vec<(&str, &str)> = inbound
            .query
            .iter()
            .filter(|(k, _)| k != TARGET_URL_PARAM && !is_overlay_key(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        merge_query(&mut url, &forwarded);

        let mut headers = header_overlay(&inbound.query);
        if !headers.contains_key(header::ACCEPT) {
            headers.insert(header::ACCEPT, HeaderValue::from_static(DEFAULT_MEDIA_TYPE));
        }

        let carries_body = method_carries_body(&inbound.method);
        if carries_body {
            if let Some(content_type) = inbound.content_type() {
                headers.insert(header::CONTENT_TYPE, content_type.clone());
            }
        }

        let body = if carries_body && !inbound.body.is_empty() {
            Some(inbound.body.clone())
        } else {
            None
        };

        Ok(Self {
            method: inbound.method.clone(),
            url,
            headers,
            body,
        })
    }
}

/// GET and HEAD never forward a body; every other method may.
pub fn method_carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

fn parse_target(raw: &str) -> Result<Url, GatewayError> {
    let url = Url::parse(raw).map_err(|e| GatewayError::InvalidTarget {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(GatewayError::InvalidTarget {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Apply `pairs` onto `url`'s query with "set" semantics.
///
/// For each pair in order: if the key already exists, its first occurrence
/// takes the new value and later occurrences are removed; otherwise the pair
/// is appended. A key repeated in `pairs` therefore ends with its last value.
/// The URL is left untouched when `pairs` is empty.
pub fn merge_query(url: &mut Url, pairs: &[(&str, &str)]) {
    if pairs.is_empty() {
        return;
    }

    let mut merged: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for (key, value) in pairs {
        match merged.iter().position(|(k, _)| k == key) {
            Some(first) => {
                merged[first].1 = value.to_string();
                let mut index = 0;
                merged.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => merged.push((key.to_string(), value.to_string())),
        }
    }

    url.query_pairs_mut().clear().extend_pairs(&merged);
}
