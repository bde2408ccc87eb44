//! Sanity failures raised by ingress checks.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// A request that failed one of the ingress checks.
///
/// Converting it into a response yields `400 Bad Request` and stores a copy
/// of the error in the response extensions, so an outer error-view layer can
/// still find out what went wrong and render its own page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanityError {
    /// POST form data with a missing or malformed multipart boundary.
    #[error("{0}")]
    InvalidFormData(String),

    /// Query string escapes that do not decode as UTF-8.
    #[error("{0}")]
    InvalidQueryString(String),

    /// Path escapes that do not decode as UTF-8.
    #[error("{0}")]
    InvalidUrl(String),
}

impl SanityError {
    pub fn invalid_form_data() -> Self {
        SanityError::InvalidFormData(
            "Invalid form data: no boundary specified in Content-Type".to_string(),
        )
    }

    pub fn invalid_query_string() -> Self {
        SanityError::InvalidQueryString("Invalid bytes in query string".to_string())
    }

    pub fn invalid_url() -> Self {
        SanityError::InvalidUrl("Invalid bytes in URL".to_string())
    }

    /// Stable label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SanityError::InvalidFormData(_) => "invalid_form_data",
            SanityError::InvalidQueryString(_) => "invalid_query_string",
            SanityError::InvalidUrl(_) => "invalid_url",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SanityError::InvalidFormData(message)
            | SanityError::InvalidQueryString(message)
            | SanityError::InvalidUrl(message) => message,
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for SanityError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), self.message().to_string()).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_messages() {
        let err = SanityError::invalid_query_string();
        assert_eq!(err.kind(), "invalid_query_string");
        assert_eq!(err.to_string(), "Invalid bytes in query string");
        assert_eq!(SanityError::invalid_url().kind(), "invalid_url");
        assert_eq!(SanityError::invalid_form_data().kind(), "invalid_form_data");
    }

    #[test]
    fn test_into_response_carries_error() {
        let response = SanityError::invalid_url().into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.extensions().get::<SanityError>(),
            Some(&SanityError::invalid_url())
        );
    }
}
