//! Shared utilities for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header::LOCATION, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceExt;

/// Header the test app copies into `Location` on its response.
pub const REDIRECT_TO: &str = "x-redirect-to";

/// Counts how many requests reached the application handler.
#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Application handler: redirects when asked to, otherwise echoes the body.
async fn app_handler(State(calls): State<Calls>, headers: HeaderMap, body: Bytes) -> Response {
    calls.0.fetch_add(1, Ordering::SeqCst);

    match headers.get(REDIRECT_TO) {
        Some(target) => (StatusCode::FOUND, [(LOCATION, target.clone())]).into_response(),
        None => (StatusCode::OK, body).into_response(),
    }
}

/// A router that answers every path with [`app_handler`].
pub fn app(calls: &Calls) -> Router {
    Router::new().fallback(app_handler).with_state(calls.clone())
}

/// Build a POST request with an optional content type and a body.
#[allow(dead_code)]
pub fn post(uri: &str, content_type: Option<&str>, body: &'static str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(Body::from(body)).unwrap()
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// A GET whose response will redirect to the raw bytes of `location`.
#[allow(dead_code)]
pub fn redirect_to(location: &str) -> Request<Body> {
    Request::builder()
        .uri("/redirect")
        .header(REDIRECT_TO, location.as_bytes())
        .body(Body::empty())
        .unwrap()
}

/// The valid request from every shared test: good path, query and form.
#[allow(dead_code)]
pub fn valid_request() -> Request<Body> {
    post(
        "/a/b?a=1",
        Some("multipart/form-data; boundary=239487389475"),
        "content",
    )
}

/// Send one request through `router`.
pub async fn send(router: Router, req: Request<Body>) -> Response {
    router.oneshot(req).await.unwrap()
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
