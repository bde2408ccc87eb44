//! Response-side normalization.
//!
//! Runs after the inner service has produced its response. There is one
//! normalization today, [`redirect::ascii_safe_redirects`], and it never fails.

pub mod redirect;

pub use redirect::{ascii_safe_location, ascii_safe_redirects};

use std::convert::identity;
use std::task::{Context, Poll};

use axum::response::Response;
use futures_util::{future::MapOk, TryFutureExt};
use tower::{Layer, Service};

use crate::config::SanitySettings;

type Rewrite = fn(Response) -> Response;

/// Layer that normalizes responses coming out of a service.
#[derive(Debug, Clone, Copy)]
pub struct EgressLayer {
    rewrite: Rewrite,
}

impl EgressLayer {
    pub fn new(settings: &SanitySettings) -> Self {
        let rewrite: Rewrite = if settings.ascii_safe_redirects {
            ascii_safe_redirects
        } else {
            identity
        };
        Self { rewrite }
    }
}

impl<S> Layer<S> for EgressLayer {
    type Service = EgressService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        EgressService {
            inner,
            rewrite: self.rewrite,
        }
    }
}

/// Wrap `handler` with the egress normalizations enabled in `settings`.
pub fn egress<S>(handler: S, settings: &SanitySettings) -> EgressService<S> {
    EgressLayer::new(settings).layer(handler)
}

/// Service produced by [`EgressLayer`].
#[derive(Debug, Clone)]
pub struct EgressService<S> {
    inner: S,
    rewrite: Rewrite,
}

impl<S, Req> Service<Req> for EgressService<S>
where
    S: Service<Req, Response = Response>,
{
    type Response = Response;
    type Error = S::Error;
    type Future = MapOk<S::Future, Rewrite>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        self.inner.call(req).map_ok(self.rewrite)
    }
}
