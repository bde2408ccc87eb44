//! Demo server for the sanity layers.
//!
//! Serves a tiny app wrapped with the layers enabled in the config file:
//! - `GET /`          plain text
//! - `POST /echo`     echoes the request body back
//! - `GET /redirect`  redirects to `?to=...` verbatim (try a non-ASCII target)

use std::collections::HashMap;
use std::path::PathBuf;

use axum::{
    body::Bytes,
    extract::Query,
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use request_sanity::config::{load_config, ServiceConfig};
use request_sanity::observability::{logging, metrics};
use request_sanity::SanityRouterExt;

#[derive(Parser)]
#[command(name = "sanity-demo")]
#[command(about = "Demo server wrapped with request sanity checks", long_about = None)]
struct Cli {
    /// TOML config file with optional [listener], [observability] and [sanity] tables.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Serve Prometheus metrics on this address.
    #[arg(short, long)]
    metrics: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(addr) = cli.metrics {
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = addr;
    }

    logging::init_tracing(&config.observability.log_filter)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        settings = ?config.sanity,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let app = Router::new()
        .route("/", get(index))
        .route("/echo", post(echo))
        .route("/redirect", get(redirect))
        .with_sanity(&config.sanity)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn index() -> &'static str {
    "ok\n"
}

async fn echo(body: Bytes) -> Bytes {
    body
}

async fn redirect(Query(params): Query<HashMap<String, String>>) -> Response {
    let target = params.get("to").map(String::as_str).unwrap_or("/");
    match HeaderValue::from_str(target) {
        Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "Unusable redirect target").into_response(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
