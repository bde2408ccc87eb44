//! Installing the sanity chains around an application.
//!
//! The chains always bracket the application as
//! `ingress checks → handler → egress normalization`.

use axum::Router;
use tower::util::{option_layer, Either};
use tower::Layer;

use crate::config::SanitySettings;
use crate::egress::{EgressLayer, EgressService};
use crate::ingress::{IngressCheck, IngressLayer, IngressService};

/// Both chains as a single layer, for wrapping an arbitrary service (for
/// example a whole `Router` so the checks run before routing).
///
/// A chain the settings do not require is left out and the inner service is
/// passed through untouched.
#[derive(Debug, Clone)]
pub struct SanityLayer {
    ingress: Option<IngressLayer>,
    egress: Option<EgressLayer>,
}

impl SanityLayer {
    pub fn new(settings: &SanitySettings) -> Self {
        Self {
            ingress: settings
                .ingress_required()
                .then(|| IngressLayer::new(settings)),
            egress: settings
                .egress_required()
                .then(|| EgressLayer::new(settings)),
        }
    }
}

impl<S> Layer<S> for SanityLayer {
    type Service = Either<IngressService<Either<EgressService<S>, S>>, Either<EgressService<S>, S>>;

    fn layer(&self, inner: S) -> Self::Service {
        let inner = option_layer(self.egress).layer(inner);
        option_layer(self.ingress.clone()).layer(inner)
    }
}

/// Adds the sanity layers to an axum `Router`.
pub trait SanityRouterExt {
    /// Install only the chains `settings` requires, ingress outermost.
    fn with_sanity(self, settings: &SanitySettings) -> Self;
}

impl<St> SanityRouterExt for Router<St>
where
    St: Clone + Send + Sync + 'static,
{
    fn with_sanity(self, settings: &SanitySettings) -> Self {
        let mut router = self;

        if settings.egress_required() {
            router = router.layer(EgressLayer::new(settings));
        }

        let ingress = IngressLayer::new(settings);
        let checks: Vec<&'static str> = ingress
            .chain()
            .checks()
            .iter()
            .map(IngressCheck::name)
            .collect();

        if settings.ingress_required() {
            router = router.layer(ingress);
        }

        tracing::info!(
            ingress = settings.ingress_required(),
            egress = settings.egress_required(),
            checks = ?checks,
            "Sanity layers installed"
        );

        router
    }
}
