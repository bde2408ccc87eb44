//! Query string encoding check.

use axum::http::Request;
use percent_encoding::percent_decode;

use crate::ingress::SanityError;

/// Reject requests whose query parameters do not decode as UTF-8.
pub fn check_query_string<B>(req: &Request<B>) -> Result<(), SanityError> {
    match req.uri().query() {
        Some(query) if !decodes_as_utf8(query) => Err(SanityError::invalid_query_string()),
        _ => Ok(()),
    }
}

/// Decode every name and value the way a form parser would (`+` is a space,
/// `%XX` is a byte) and report whether all of them are valid UTF-8.
pub fn decodes_as_utf8(query: &str) -> bool {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .flat_map(|pair| match pair.split_once('=') {
            Some((name, value)) => [name, value],
            None => [pair, ""],
        })
        .all(|component| {
            let component = component.replace('+', " ");
            percent_decode(component.as_bytes()).decode_utf8().is_ok()
        })
}
