//! Control-panel static assets: filesystem (dev) or embedded (release).
//!
//! When `PROMPTLOOP_ASSETS_DIR` points at a directory (or the crate source
//! tree is present, i.e. `cargo run`), assets are served from disk so edits
//! show up on reload. Otherwise the `assets/` directory embedded at compile
//! time is used.

use std::{path::PathBuf, sync::LazyLock};

use {
    axum::{
        extract::Path,
        http::{StatusCode, header},
        response::{IntoResponse, Response},
    },
    tracing::info,
};

static ASSETS: include_dir::Dir = include_dir::include_dir!("$CARGO_MANIFEST_DIR/assets");

static FS_ASSETS_DIR: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    if let Ok(dir) = std::env::var("PROMPTLOOP_ASSETS_DIR") {
        let p = PathBuf::from(dir);
        if p.is_dir() {
            info!("serving assets from filesystem: {}", p.display());
            return Some(p);
        }
    }

    let cargo_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
    if cargo_dir.is_dir() {
        info!("serving assets from filesystem: {}", cargo_dir.display());
        return Some(cargo_dir);
    }

    info!("serving assets from embedded binary");
    None
});

pub async fn index() -> Response {
    serve("index.html")
}

pub async fn asset(Path(path): Path<String>) -> Response {
    serve(&path)
}

fn serve(path: &str) -> Response {
    if path.contains("..") {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }

    let contents: Option<Vec<u8>> = match FS_ASSETS_DIR.as_ref() {
        Some(dir) => std::fs::read(dir.join(path)).ok(),
        None => ASSETS.get_file(path).map(|f| f.contents().to_vec()),
    };

    match contents {
        Some(bytes) => {
            ([(header::CONTENT_TYPE, content_type(path))], bytes).into_response()
        },
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
