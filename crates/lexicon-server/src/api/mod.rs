//! HTTP API
//!
//! JSON endpoints under `/api`, a `/health` probe and the embedded web UI.

pub mod error;
pub mod handlers;
pub mod state;
pub mod static_files;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use lexicon_core::Storage;
use state::AppState;

/// Build the axum router with all routes and layers
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", config.port),
        format!("http://localhost:{}", config.port),
        config.base_url(),
    ]
    .iter()
    .filter_map(|origin| origin.parse::<HeaderValue>().ok())
    .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let csp = SetResponseHeaderLayer::overriding(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'self'; style-src 'self' 'unsafe-inline'"),
    );

    let mut router = Router::new()
        .route(
            "/api/words",
            get(handlers::list_words)
                .post(handlers::create_word)
                .delete(handlers::delete_all_words),
        )
        .route("/api/words/import", post(handlers::import_words))
        .route("/api/words/review", get(handlers::review_queue))
        .route(
            "/api/words/{id}",
            get(handlers::get_word)
                .put(handlers::update_word)
                .delete(handlers::delete_word),
        )
        .route("/api/words/{id}/review", post(handlers::submit_review))
        .route("/api/stats", get(handlers::get_stats))
        .route("/health", get(handlers::health_check));

    if config.static_enabled {
        router = router
            .route("/", get(static_files::serve_index))
            .route("/{*path}", get(static_files::serve_asset));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_requests))
                .concurrency_limit(50)
                .layer(cors)
                .layer(csp),
        )
        .with_state(state)
}

/// One log line per request
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), latency_ms, "request failed");
    } else {
        info!(%method, %path, status = status.as_u16(), latency_ms, "request");
    }
    response
}

/// Bind and serve until Ctrl-C
pub async fn serve(
    config: ServerConfig,
    storage: Arc<Storage>,
    open_browser: bool,
) -> std::io::Result<()> {
    let state = AppState::new(storage).with_review_batch(config.review_batch_size);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let url = config.base_url();
    info!("Lexicon available at {}", url);

    if open_browser && config.static_enabled {
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                warn!("Could not open browser: {}", e);
            }
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
