//! Last.fm API Data Transfer Objects
//!
//! These types match what `user.getTopAlbums` returns.
//! DO NOT use these types outside the history module - convert to domain types.
//!
//! API Reference: https://www.last.fm/api/show/user.getTopAlbums
//!
//! Last.fm encodes numbers as strings and uses `#text` / `@attr` keys:
//! ```json
//! {"topalbums": {"album": [{
//!     "name": "In Rainbows", "playcount": "42", "url": "https://www.last.fm/music/...",
//!     "artist": {"name": "Radiohead", "mbid": "", "url": "..."},
//!     "image": [{"#text": "https://lastfm.freetls.fastly.net/i/u/34s/x.png", "size": "small"}],
//!     "@attr": {"rank": "1"}
//! }], "@attr": {"user": "rj", "page": "1", "perPage": "2", "totalPages": "50", "total": "100"}}}
//! ```

use serde::{Deserialize, Serialize};

/// Either an error payload or the top-albums payload.
///
/// Last.fm returns errors with HTTP 200, so both shapes arrive on success.
/// `Error` is listed first: it requires the `error` key, which a valid
/// payload never has.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TopAlbumsEnvelope {
    Error(ApiError),
    TopAlbums(TopAlbumsResponse),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: i32,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopAlbumsResponse {
    pub topalbums: TopAlbums,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopAlbums {
    #[serde(default)]
    pub album: Vec<Album>,
    #[serde(rename = "@attr")]
    pub attr: Option<PageAttr>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAttr {
    pub user: String,
    pub page: String,
    pub per_page: String,
    pub total_pages: String,
    pub total: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub name: String,
    pub artist: Artist,
    /// Play count as a decimal string
    pub playcount: String,
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: Vec<Image>,
    #[serde(rename = "@attr")]
    pub attr: Option<RankAttr>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub name: String,
    pub mbid: Option<String>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    #[serde(rename = "#text")]
    pub text: String,
    pub size: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankAttr {
    pub rank: String,
}
