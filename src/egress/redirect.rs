//! ASCII-safe redirect locations.
//!
//! Handlers sometimes build a `Location` from user-supplied text. Header
//! values may carry raw non-ASCII bytes, but clients and proxies handle them
//! inconsistently, so such locations are percent-encoded segment by segment.

use axum::{
    http::{header::LOCATION, HeaderValue},
    response::Response,
};
use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::observability::metrics;

/// Bytes kept as-is when quoting a segment: ASCII alphanumerics and `_.-~`.
/// Spaces are handled separately and become `+`.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Return the ASCII-safe form of `location`, or `None` when it is empty or
/// already pure ASCII.
pub fn ascii_safe_location(location: &HeaderValue) -> Option<HeaderValue> {
    let bytes = location.as_bytes();
    if bytes.is_empty() || bytes.is_ascii() {
        return None;
    }

    let encoded = bytes
        .split(|b| *b == b'/')
        .map(quote_plus)
        .collect::<Vec<_>>()
        .join("/");

    match HeaderValue::from_str(&encoded) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, "Could not rebuild Location header");
            None
        }
    }
}

/// Percent-encode one path segment, turning spaces into `+`.
pub fn quote_plus(segment: &[u8]) -> String {
    segment
        .split(|b| *b == b' ')
        .map(|piece| percent_encode(piece, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Rewrite the response's `Location` header if it is not ASCII-safe.
pub fn ascii_safe_redirects(mut response: Response) -> Response {
    let rewritten = response
        .headers()
        .get(LOCATION)
        .and_then(ascii_safe_location);

    if let Some(location) = rewritten {
        tracing::debug!(
            location = ?location,
            status = %response.status(),
            "Rewrote non-ASCII redirect location"
        );
        metrics::record_redirect_rewrite();
        response.headers_mut().insert(LOCATION, location);
    }

    response
}
