//! POST form boundary check.
//!
//! Form bodies are parsed lazily by handlers. A multipart or urlencoded
//! submission without a usable boundary blows up deep inside that parser, so
//! the boundary is validated up front from the `Content-Type` header alone.
//! The body is never polled and the check can run any number of times.

use std::collections::HashMap;
use std::sync::LazyLock;

use axum::http::{header::CONTENT_TYPE, Method, Request};
use regex::Regex;

use crate::ingress::SanityError;

pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Printable ASCII, at most 201 characters, not ending in a space.
static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ -~]{0,200}[!-~]$").expect("boundary grammar is a valid regex")
});

/// Validate the form boundary of a POST request.
pub fn check_form<B>(req: &Request<B>, assume_form_on_blank: bool) -> Result<(), SanityError> {
    if req.method() != Method::POST {
        return Ok(());
    }

    let header = req
        .headers()
        .get(CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();

    let content_type = if header.is_empty() && assume_form_on_blank {
        MULTIPART_FORM_DATA.to_string()
    } else {
        header
    };

    let (base, params) = parse_content_type(&content_type);
    if base != MULTIPART_FORM_DATA && base != FORM_URLENCODED {
        return Ok(());
    }

    match params.get("boundary") {
        Some(boundary) if valid_boundary(boundary) => Ok(()),
        _ => Err(SanityError::invalid_form_data()),
    }
}

/// Whether `boundary` satisfies the multipart boundary grammar.
pub fn valid_boundary(boundary: &str) -> bool {
    BOUNDARY.is_match(boundary)
}

/// Split a `Content-Type` value into its lowercased base type and a map of
/// parameters. Parameter names are lowercased; quoted values are unquoted.
pub fn parse_content_type(value: &str) -> (String, HashMap<String, String>) {
    let mut parts = split_params(value).into_iter();
    let base = parts
        .next()
        .map(|part| part.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let params = parts
        .filter_map(|part| {
            let (name, value) = part.split_once('=')?;
            Some((name.trim().to_ascii_lowercase(), unquote(value.trim())))
        })
        .collect();

    (base, params)
}

/// Split on `;` outside of double-quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, ch) in value.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn unquote(value: &str) -> String {
    match value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\\\\", "\\").replace("\\\"", "\""),
        None => value.to_string(),
    }
}
