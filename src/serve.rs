// src/serve.rs
// =============================================================================
// Serves a finished mirror over HTTP so it can be browsed offline.
//
// tower-http's ServeDir does the real work: paths map straight onto the
// mirror directory and a request for a directory returns its index.html,
// which is exactly the layout the mirror writes.
// =============================================================================

use anyhow::{bail, Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::services::ServeDir;
use tracing::info;

pub fn router(dir: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(dir).append_index_html_on_directories(true))
}

pub async fn serve(dir: &Path, port: u16) -> Result<()> {
    if !dir.is_dir() {
        bail!(
            "mirror directory {} does not exist, run `site-mirror download` first",
            dir.display()
        );
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind to port {}", port))?;

    info!("Serving {} at http://localhost:{}", dir.display(), port);
    axum::serve(listener, router(dir))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server error")?;

    Ok(())
}
