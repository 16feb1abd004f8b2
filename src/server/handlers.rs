//! Route handlers.
//!
//! Every handler answers with JSON. Upstream trouble is mapped to a status
//! code here; nothing is rejected, so warp's default rejection pages never
//! leak out of the API routes.

use std::collections::HashMap;
use std::convert::Infallible;

use serde::Serialize;
use warp::Reply;
use warp::http::StatusCode;
use warp::reply::Response;

use super::AppState;
use crate::catalog::CatalogError;
use crate::history::HistoryError;

/// Shared caching policy: one hour fresh, one day stale.
pub const CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=86400";

fn json_error(message: impl Into<String>, status: StatusCode) -> Response {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": message.into() })),
        status,
    )
    .into_response()
}

fn cached_json<T: Serialize>(body: &T) -> Response {
    warp::reply::with_header(warp::reply::json(body), "Cache-Control", CACHE_CONTROL)
        .into_response()
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// `GET /api/spotify/search?albumName=..&artistName=..`
pub async fn search(
    params: HashMap<String, String>,
    state: AppState,
) -> Result<Response, Infallible> {
    let (Some(album), Some(artist)) = (
        non_empty(&params, "albumName"),
        non_empty(&params, "artistName"),
    ) else {
        return Ok(json_error(
            "Missing albumName or artistName query parameters",
            StatusCode::BAD_REQUEST,
        ));
    };

    let response = match state.resolver.resolve(album, artist).await {
        Ok(Some(found)) => cached_json(&found),
        Ok(None) => warp::reply::json(&serde_json::Value::Null).into_response(),
        Err(CatalogError::MissingCredentials) => json_error(
            "Spotify API credentials not configured",
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        Err(e) => {
            // resolve() only surfaces configuration errors, but stay safe
            tracing::warn!("Search for '{}' by '{}' failed: {}", album, artist, e);
            warp::reply::json(&serde_json::Value::Null).into_response()
        }
    };
    Ok(response)
}

/// `GET /api/lastfm`
pub async fn top_albums(state: AppState) -> Result<Response, Infallible> {
    let response = match state.history.top_albums().await {
        Ok(records) => cached_json(&records),
        Err(HistoryError::MissingCredentials) => json_error(
            "Last.fm API credentials not configured",
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        Err(HistoryError::Upstream { status, message }) => json_error(
            format!("Last.fm API error: {}", message),
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
        ),
        Err(HistoryError::Api { message, .. }) => json_error(
            format!("Last.fm API error: {}", message),
            StatusCode::BAD_REQUEST,
        ),
        Err(e) => {
            tracing::error!("Error fetching Last.fm data: {}", e);
            json_error("Failed to fetch Last.fm data", StatusCode::INTERNAL_SERVER_ERROR)
        }
    };
    Ok(response)
}
