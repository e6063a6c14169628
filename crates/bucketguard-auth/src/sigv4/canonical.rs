//! Canonical request construction.
//!
//! ```text
//! METHOD\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! PayloadHash
//! ```

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::AuthError;
use crate::request::RequestView;

/// Everything except RFC 3986 unreserved characters is encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the canonical request for `req`.
///
/// `skip_query_key` drops one query parameter (presigned URLs exclude
/// `X-Amz-Signature`).
///
/// # Errors
///
/// Returns [`AuthError::MissingHeader`] if a signed header is absent.
pub fn canonical_request(
    req: &dyn RequestView,
    signed_headers: &[String],
    payload_hash: &str,
    skip_query_key: Option<&str>,
) -> Result<String, AuthError> {
    let uri = canonical_uri(req.path());
    let query = canonical_query(req.query().unwrap_or(""), skip_query_key);
    let headers = canonical_headers(req, signed_headers)?;
    let mut names: Vec<&str> = signed_headers.iter().map(String::as_str).collect();
    names.sort_unstable();
    let method = req.method().as_str();

    Ok(format!(
        "{method}\n{uri}\n{query}\n{headers}\n\n{}\n{payload_hash}",
        names.join(";")
    ))
}

/// Re-encode each path segment; `/` separators survive and an empty path is `/`.
#[must_use]
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }
    path.split('/')
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            utf8_percent_encode(&decoded, URI_ENCODE_SET).to_string()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Sort query parameters by key then value, keeping the client's encoding.
#[must_use]
pub fn canonical_query(query: &str, skip_key: Option<&str>) -> String {
    let mut params: Vec<(&str, &str)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .filter(|(key, _)| Some(*key) != skip_key)
        .collect();
    params.sort_unstable();
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// `name:value` lines for the signed headers, sorted by name.
///
/// Repeated headers are joined with `,`; values are trimmed and inner runs of
/// whitespace collapse to one space.
///
/// # Errors
///
/// Returns [`AuthError::MissingHeader`] if a signed header is absent or not visible ASCII.
pub fn canonical_headers(
    req: &dyn RequestView,
    signed_headers: &[String],
) -> Result<String, AuthError> {
    let mut lines: BTreeMap<String, String> = BTreeMap::new();
    for name in signed_headers {
        let name = name.to_ascii_lowercase();
        let mut values = Vec::new();
        for value in req.headers().get_all(name.as_str()) {
            let value = value
                .to_str()
                .map_err(|_| AuthError::MissingHeader(name.clone()))?;
            values.push(collapse_whitespace(value.trim()));
        }
        if values.is_empty() {
            return Err(AuthError::MissingHeader(name));
        }
        lines.insert(name, values.join(","));
    }
    Ok(lines
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
