//! Ingress chain behaviour through a real axum router.

use std::convert::Infallible;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use request_sanity::{ingress, IngressLayer, SanityError, SanitySettings, SanityRouterExt};
use tower::{service_fn, ServiceExt};

mod common;
use common::{app, body_string, get, post, send, valid_request, Calls};

fn only(check: &str) -> SanitySettings {
    let mut settings = SanitySettings::disabled();
    match check {
        "form" => settings.check_form = true,
        "params" => settings.check_params = true,
        "path" => settings.check_path = true,
        _ => unreachable!(),
    }
    settings
}

async fn assert_rejected(settings: &SanitySettings, req: Request<Body>, expected: SanityError) {
    let calls = Calls::default();
    let response = send(app(&calls).with_sanity(settings), req).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.extensions().get::<SanityError>(), Some(&expected));
    assert_eq!(body_string(response).await, expected.message());
    assert_eq!(calls.count(), 0, "handler must not run");
}

#[tokio::test]
async fn test_valid_requests_reach_the_handler() {
    for check in ["form", "params", "path"] {
        let calls = Calls::default();
        let response = send(app(&calls).with_sanity(&only(check)), valid_request()).await;

        assert_eq!(response.status(), StatusCode::OK, "{check}");
        assert!(response.extensions().get::<SanityError>().is_none());
        assert_eq!(body_string(response).await, "content");
        assert_eq!(calls.count(), 1);
    }
}

#[tokio::test]
async fn test_invalid_form_post() {
    for form_type in ["multipart/form-data", "application/x-www-form-urlencoded"] {
        assert_rejected(
            &only("form"),
            post("/", Some(form_type), ""),
            SanityError::invalid_form_data(),
        )
        .await;
    }
}

#[tokio::test]
async fn test_form_check_with_boundary_passes() {
    let calls = Calls::default();
    let req = post("/", Some("multipart/form-data; boundary=abc123"), "");
    let response = send(app(&calls).with_sanity(&only("form")), req).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.count(), 1);
}

#[tokio::test]
async fn test_form_check_does_not_consume_the_body() {
    for form_type in ["multipart/form-data", "application/x-www-form-urlencoded"] {
        let calls = Calls::default();
        let content_type = format!("{form_type}; boundary=valid-boundary-------");
        let req = post("/", Some(content_type.as_str()), "content");

        let response = send(app(&calls).with_sanity(&only("form")), req).await;

        assert_eq!(body_string(response).await, "content");
    }
}

#[tokio::test]
async fn test_form_check_ignores_other_requests() {
    let cases = [
        Request::builder()
            .method("GET")
            .uri("/any")
            .header("content-type", "multipart/form-data")
            .body(Body::empty())
            .unwrap(),
        post("/any", Some("other"), ""),
        post("/any", Some(""), ""),
        post("/any", None, ""),
    ];

    for req in cases {
        let calls = Calls::default();
        let response = send(app(&calls).with_sanity(&only("form")), req).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.count(), 1);
    }
}

#[tokio::test]
async fn test_assume_form_on_blank() {
    let mut settings = only("form");
    settings.assume_form_on_blank = true;

    assert_rejected(&settings, post("/", Some(""), ""), SanityError::invalid_form_data()).await;
    assert_rejected(&settings, post("/", None, ""), SanityError::invalid_form_data()).await;
}

#[tokio::test]
async fn test_invalid_query_string() {
    assert_rejected(
        &only("params"),
        get("/?f%FC=123"),
        SanityError::invalid_query_string(),
    )
    .await;

    let calls = Calls::default();
    let response = send(app(&calls).with_sanity(&only("params")), get("/?a=1")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_path() {
    assert_rejected(&only("path"), get("/%BF%B"), SanityError::invalid_url()).await;

    let calls = Calls::default();
    let response = send(app(&calls).with_sanity(&only("path")), get("/a/b")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_disabled_check_lets_bad_request_through() {
    let calls = Calls::default();
    let settings = SanitySettings {
        check_path: false,
        ..SanitySettings::default()
    };

    let response = send(app(&calls).with_sanity(&settings), get("/%BF%B")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.count(), 1);
}

#[tokio::test]
async fn test_factory_wraps_plain_services() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let handler = service_fn(move |_req: Request<Body>| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<Response, Infallible>(StatusCode::NO_CONTENT.into_response())
        }
    });
    let service = ingress(handler, &SanitySettings::default());

    let response = service.clone().oneshot(get("/%BF%B")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let response = service.oneshot(get("/a/b?a=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_other_errors_propagate() {
    let failing = service_fn(|_req: Request<Body>| async {
        Err::<Response, io::Error>(io::Error::new(io::ErrorKind::Other, "backend exploded"))
    });
    let layer = IngressLayer::new(&SanitySettings::default());

    let err = tower::Layer::layer(&layer, failing.clone())
        .oneshot(get("/a/b"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "backend exploded");

    let response = tower::Layer::layer(&layer, failing)
        .oneshot(get("/?f%FC=123"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
