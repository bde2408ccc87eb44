//! Request-side sanity checks.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → form.rs   (POST boundary from Content-Type)
//!     → query.rs  (query string decodes as UTF-8)
//!     → path.rs   (path decodes as UTF-8)
//!     → inner service, or a 400 response carrying the SanityError
//! ```
//!
//! # Design Decisions
//! - The active check list is built once per layer, never per request
//! - The first failing check wins; later checks are skipped
//! - Failures become responses at this boundary so outer layers still see
//!   an ordinary response; inner service errors pass through untouched

pub mod error;
pub mod form;
pub mod path;
pub mod query;

pub use error::SanityError;

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    http::Request,
    response::{IntoResponse, Response},
};
use futures_util::future::{self, Either, Ready};
use tower::{Layer, Service};

use crate::config::SanitySettings;
use crate::observability::metrics;

/// A single request-side check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngressCheck {
    Form { assume_form_on_blank: bool },
    QueryString,
    Path,
}

impl IngressCheck {
    pub fn name(&self) -> &'static str {
        match self {
            IngressCheck::Form { .. } => "form",
            IngressCheck::QueryString => "query_string",
            IngressCheck::Path => "path",
        }
    }

    pub fn check<B>(&self, req: &Request<B>) -> Result<(), SanityError> {
        match self {
            IngressCheck::Form {
                assume_form_on_blank,
            } => form::check_form(req, *assume_form_on_blank),
            IngressCheck::QueryString => query::check_query_string(req),
            IngressCheck::Path => path::check_path(req),
        }
    }
}

/// The ordered, immutable list of active ingress checks.
#[derive(Debug, Clone)]
pub struct IngressChain {
    checks: Arc<[IngressCheck]>,
}

impl IngressChain {
    /// Build the chain from settings: form, then query string, then path,
    /// each only if enabled.
    pub fn from_settings(settings: &SanitySettings) -> Self {
        let mut checks = Vec::with_capacity(3);
        if settings.check_form {
            checks.push(IngressCheck::Form {
                assume_form_on_blank: settings.assume_form_on_blank,
            });
        }
        if settings.check_params {
            checks.push(IngressCheck::QueryString);
        }
        if settings.check_path {
            checks.push(IngressCheck::Path);
        }

        Self {
            checks: checks.into(),
        }
    }

    pub fn checks(&self) -> &[IngressCheck] {
        &self.checks
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check in order, stopping at the first failure.
    pub fn run<B>(&self, req: &Request<B>) -> Result<(), SanityError> {
        for check in self.checks.iter() {
            if let Err(err) = check.check(req) {
                tracing::warn!(
                    check = check.name(),
                    error = err.kind(),
                    method = %req.method(),
                    path = %req.uri().path(),
                    "Request rejected by sanity check"
                );
                metrics::record_rejection(check.name());
                return Err(err);
            }
        }
        Ok(())
    }
}

/// Layer that applies the ingress chain in front of a service.
#[derive(Debug, Clone)]
pub struct IngressLayer {
    chain: IngressChain,
}

impl IngressLayer {
    pub fn new(settings: &SanitySettings) -> Self {
        Self {
            chain: IngressChain::from_settings(settings),
        }
    }

    pub fn chain(&self) -> &IngressChain {
        &self.chain
    }
}

impl<S> Layer<S> for IngressLayer {
    type Service = IngressService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        IngressService {
            inner,
            chain: self.chain.clone(),
        }
    }
}

/// Wrap `handler` with the ingress checks enabled in `settings`.
pub fn ingress<S>(handler: S, settings: &SanitySettings) -> IngressService<S> {
    IngressLayer::new(settings).layer(handler)
}

/// Service produced by [`IngressLayer`].
#[derive(Debug, Clone)]
pub struct IngressService<S> {
    inner: S,
    chain: IngressChain,
}

impl<S> IngressService<S> {
    pub fn chain(&self) -> &IngressChain {
        &self.chain
    }
}

impl<S, B> Service<Request<B>> for IngressService<S>
where
    S: Service<Request<B>, Response = Response>,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Either<Ready<Result<Response, S::Error>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        match self.chain.run(&req) {
            Ok(()) => Either::Right(self.inner.call(req)),
            Err(err) => Either::Left(future::ready(Ok(err.into_response()))),
        }
    }
}
