//! HTTP service exposing the resolver and listening history to a web UI.
//!
//! Routes:
//! - `GET /api/spotify/search?albumName=..&artistName=..` → album match or `null`
//! - `GET /api/lastfm` → top albums
//!
//! Credentials stay on the server; the token cache is never exposed.

mod handlers;

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use warp::Filter;

use crate::history::ListeningHistoryApi;
use crate::matching::AlbumResolver;

pub use handlers::CACHE_CONTROL;

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub resolver: AlbumResolver,
    pub history: Arc<dyn ListeningHistoryApi>,
}

impl AppState {
    pub fn new(resolver: AlbumResolver, history: Arc<dyn ListeningHistoryApi>) -> Self {
        Self { resolver, history }
    }
}

/// All API routes.
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());

    let search = warp::path!("api" / "spotify" / "search")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(state_filter.clone())
        .and_then(handlers::search);

    let lastfm = warp::path!("api" / "lastfm")
        .and(warp::get())
        .and(state_filter)
        .and_then(handlers::top_albums);

    search
        .or(lastfm)
        .with(warp::trace::request())
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), warp::Error> {
    let (bound, server) =
        warp::serve(routes(state)).try_bind_with_graceful_shutdown(addr, shutdown)?;
    tracing::info!("Listening on http://{}", bound);
    server.await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        // Never resolve; the server keeps running without signal handling
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
