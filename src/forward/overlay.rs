//! Header overlay: outbound headers carried in inbound query parameters.
//!
//! A query key `header_<Name>` (prefix matched case-insensitively) becomes
//! the outbound header `<name>`, with every `_` in the suffix replaced by `-`.
//! `header_Accept_Language=fr` therefore yields `accept-language: fr`.
//!
//! Later pairs overwrite earlier ones for the same header name.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Query prefix that marks a header overlay key.
pub const HEADER_PREFIX: &str = "header_";

/// Headers the outbound client computes itself; overlay values are ignored.
/// Relayed responses never carry `content-encoding`, so `accept-encoding`
/// belongs here too.
const TRANSPORT_MANAGED: [&str; 5] = [
    "host",
    "content-length",
    "transfer-encoding",
    "connection",
    "accept-encoding",
];

/// Returns the overlay suffix if `key` carries the header prefix.
pub fn overlay_suffix(key: &str) -> Option<&str> {
    let prefix = key.get(..HEADER_PREFIX.len())?;
    if prefix.eq_ignore_ascii_case(HEADER_PREFIX) {
        Some(&key[HEADER_PREFIX.len()..])
    } else {
        None
    }
}

/// True if `key` is consumed by the header overlay rather than forwarded as a
/// query parameter.
pub fn is_overlay_key(key: &str) -> bool {
    overlay_suffix(key).is_some()
}

/// Canonical lowercase header name for an overlay suffix.
pub fn header_name_for_suffix(suffix: &str) -> String {
    suffix.replace('_', "-").to_ascii_lowercase()
}

/// Build the header overlay from ordered query pairs.
pub fn header_overlay<K, V>(pairs: &[(K, V)]) -> HeaderMap
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut headers = HeaderMap::new();

    for (key, value) in pairs {
        let Some(suffix) = overlay_suffix(key.as_ref()) else {
            continue;
        };
        let name = header_name_for_suffix(suffix);
        if name.is_empty() || TRANSPORT_MANAGED.contains(&name.as_str()) {
            tracing::debug!(key = %key.as_ref(), "Ignoring header overlay key");
            continue;
        }

        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                tracing::debug!(key = %key.as_ref(), "Ignoring invalid header name");
                continue;
            }
        };
        let value = match HeaderValue::from_str(value.as_ref()) {
            Ok(value) => value,
            Err(_) => {
                tracing::debug!(header = %name, "Ignoring invalid header value");
                continue;
            }
        };

        headers.insert(name, value);
    }

    headers
}
