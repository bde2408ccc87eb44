//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sanity_rejections_total` (counter): requests rejected, by `check`
//!   (`form`, `query_string`, `path`)
//! - `sanity_redirects_rewritten_total` (counter): `Location` headers encoded
//!
//! Recording is a no-op until a recorder is installed, so library users who
//! never call [`init_metrics`] pay nothing.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_rejection(check: &'static str) {
    metrics::counter!("sanity_rejections_total", "check" => check).increment(1);
}

pub fn record_redirect_rewrite() {
    metrics::counter!("sanity_redirects_rewritten_total").increment(1);
}
