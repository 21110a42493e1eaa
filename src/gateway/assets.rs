//! Static files for every path no route claims, i.e. the demo UI.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse as _, Response};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[must_use]
pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// File under `root` for `request_path`; `/` is `/index.html`. `None` for
/// paths trying to climb out of `root`.
#[must_use]
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = match request_path {
        "" | "/" => "index.html",
        other => other.trim_start_matches('/'),
    };
    if relative.split(['/', '\\']).any(|segment| segment == "..") {
        return None;
    }

    Some(root.join(relative))
}

pub async fn serve(root: &Path, request_path: &str) -> Response {
    let Some(path) = resolve(root, request_path) else {
        return not_found();
    };

    match tokio::fs::read(&path).await {
        Ok(content) => (
            StatusCode::OK,
            [(CONTENT_TYPE, content_type(&path))],
            content,
        )
            .into_response(),
        Err(e) if e.kind() == ErrorKind::NotFound => not_found(),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to read static file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, TEXT_PLAIN)],
                "Server error",
            )
                .into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, [(CONTENT_TYPE, TEXT_PLAIN)], "Not found").into_response()
}
