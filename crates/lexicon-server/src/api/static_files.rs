//! Embedded web UI.
//!
//! The `assets/` directory is compiled into the binary with `include_dir!`
//! and served from the site root. Unknown non-API paths fall back to
//! `index.html`.

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use include_dir::{include_dir, Dir};

static ASSETS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Serve the UI entry page
pub async fn serve_index() -> Response {
    match ASSETS_DIR.get_file("index.html") {
        Some(file) => Html(String::from_utf8_lossy(file.contents()).to_string()).into_response(),
        None => (StatusCode::NOT_FOUND, "Web UI not bundled").into_response(),
    }
}

/// Serve a bundled asset, or the entry page for client-side routes
pub async fn serve_asset(Path(path): Path<String>) -> Response {
    if path == "api" || path.starts_with("api/") {
        return super::error::ApiError::NotFound(format!("No route for /{}", path)).into_response();
    }

    if let Some(file) = ASSETS_DIR.get_file(&path) {
        let mime = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        return (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime),
                (header::CACHE_CONTROL, "public, max-age=60".to_string()),
            ],
            file.contents().to_vec(),
        )
            .into_response();
    }

    serve_index().await
}
