//! Request path encoding check.

use axum::http::Request;
use percent_encoding::percent_decode_str;

use crate::ingress::SanityError;

/// Reject requests whose path does not percent-decode to UTF-8.
///
/// Escapes that are not followed by two hex digits stay literal, which is
/// what the router will see as well.
pub fn check_path<B>(req: &Request<B>) -> Result<(), SanityError> {
    percent_decode_str(req.uri().path())
        .decode_utf8()
        .map(|_| ())
        .map_err(|_| SanityError::invalid_url())
}
