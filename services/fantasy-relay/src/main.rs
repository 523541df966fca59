//! Fantasy Relay
//!
//! Single-binary Rust service that:
//! 1. Walks one user through Yahoo's OAuth2 authorization-code flow
//! 2. Keeps the resulting access token in memory
//! 3. Proxies league scoreboard and draft results as plain JSON
//! 4. Serves the browser bundle, falling back to `index.html`

mod auth;
mod config;
mod error;
mod metrics;
mod proxy;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yahoo_auth::TokenStore;

use crate::auth::{AuthState, CallbackParams};
use crate::config::Config;
use crate::error::ApiError;
use crate::metrics::RelayMetrics;
use crate::proxy::{LeagueResource, ProxyState};

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    auth: AuthState,
    proxy: ProxyState,
    metrics: RelayMetrics,
    prometheus: PrometheusHandle,
    static_dir: PathBuf,
}

/// Build the axum router with all routes and shared state.
///
/// Unmatched paths go to the static bundle; files that do not exist fall
/// back to `index.html` so client-side routes resolve.
fn build_router(state: AppState, max_connections: usize) -> Router {
    let assets = ServeDir::new(&state.static_dir)
        .fallback(ServeFile::new(state.static_dir.join("index.html")));

    Router::new()
        .route("/auth/start", get(auth_start_handler))
        .route("/auth/callback", get(auth_callback_handler))
        .route("/auth/status", get(auth_status_handler))
        .route("/scoreboard", get(scoreboard_handler))
        .route("/draftresults", get(draft_results_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .fallback_service(assets)
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting fantasy-relay");

    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let (config_path, explicit) = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), explicit, "loading configuration");

    let config = Config::load(&config_path, explicit)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        warn!(
            ?missing,
            "Yahoo client credentials not configured; authorization will fail upstream"
        );
    }

    info!(
        port = config.server.port,
        league_key = %config.yahoo.league_key,
        redirect_uri = %config.yahoo.redirect_uri,
        static_dir = %config.server.static_dir.display(),
        "configuration loaded"
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let tokens = Arc::new(TokenStore::new());

    let auth_state = AuthState::new(
        client.clone(),
        config.credentials(),
        &config.yahoo.authorize_url,
        config.yahoo.token_url.clone(),
        tokens.clone(),
    )
    .context("failed to build authorization URL")?;

    let app_state = AppState {
        auth: auth_state,
        proxy: ProxyState {
            client,
            api_base_url: config.yahoo.api_base_url.clone(),
            league_key: config.yahoo.league_key.clone(),
            tokens,
        },
        metrics: RelayMetrics::new(),
        prometheus: prometheus_handle,
        static_dir: config.server.static_dir.clone(),
    };

    let app = build_router(app_state, config.server.max_connections);

    let listen_addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;

    info!(addr = %listen_addr, "accepting requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

/// Count a finished request and record its status and latency.
fn finish(state: &AppState, route: &'static str, started: Instant, response: Response) -> Response {
    state.metrics.requests_total.fetch_add(1, Ordering::Relaxed);
    metrics::record_request(
        route,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

async fn auth_start_handler(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let response = auth::start_authorization(&state.auth);
    finish(&state, "auth_start", started, response)
}

async fn auth_callback_handler(
    State(state): State<AppState>,
    query: Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
    let started = Instant::now();
    let request_id = new_request_id();
    let response = match query {
        Ok(Query(params)) => auth::complete_authorization(&state.auth, params, &request_id)
            .await
            .into_response(),
        Err(rejection) => {
            warn!(request_id, error = %rejection, "malformed callback query");
            ApiError::MissingCode.into_response()
        }
    };
    finish(&state, "auth_callback", started, response)
}

/// Lets the browser decide whether to start login. Never exposes the token.
async fn auth_status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let authenticated = state.auth.tokens.is_authenticated().await;
    axum::Json(serde_json::json!({ "authenticated": authenticated }))
}

async fn scoreboard_handler(State(state): State<AppState>) -> Response {
    league_resource(state, LeagueResource::Scoreboard, "scoreboard").await
}

async fn draft_results_handler(State(state): State<AppState>) -> Response {
    league_resource(state, LeagueResource::DraftResults, "draftresults").await
}

async fn league_resource(
    state: AppState,
    resource: LeagueResource,
    route: &'static str,
) -> Response {
    let started = Instant::now();
    let request_id = new_request_id();
    let response = proxy::fetch_league_resource(&state.proxy, resource, &request_id)
        .await
        .into_response();
    finish(&state, route, started, response)
}

/// Health endpoint: liveness plus whether a token is held.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.metrics.started_at.elapsed().as_secs();
    let requests = state.metrics.requests_total.load(Ordering::Relaxed);
    let authenticated = state.auth.tokens.is_authenticated().await;

    axum::Json(serde_json::json!({
        "status": "healthy",
        "authenticated": authenticated,
        "uptime_seconds": uptime,
        "requests_served": requests,
    }))
}

/// Prometheus metrics endpoint in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
