//! Music catalog integration - album search, track listing and preview lookup.
//!
//! # Architecture
//!
//! Same layering for every external service in this crate:
//! - **Domain models** (`domain.rs`) - Internal types used by the resolver
//! - **API DTOs** (`dto.rs`) - Exact API response shapes
//! - **Adapter** (`adapter.rs`) - Converts DTOs to domain models
//! - **Client** (`client.rs`) - HTTP client for the Web API and embed pages
//! - **Token** (`token.rs`) - Client-credentials exchange and token cache
//! - **Traits** (`traits.rs`) - Seams for dependency injection and mocks
//!
//! # Usage
//!
//! ```ignore
//! let http = catalog::build_http_client()?;
//! let tokens = TokenCache::new(ClientCredentials::new(id, secret, http.clone()));
//! let client = CatalogClient::with_http_client(http);
//!
//! let credential = tokens.get_token().await?;
//! let albums = client.search_albums(&credential, "Discovery", "Daft Punk").await?;
//! ```

pub mod adapter;
mod client;
pub mod domain;
pub mod dto;
pub mod embed;
pub mod token;
pub mod traits;

pub use client::{CatalogClient, SEARCH_LIMIT, TRACK_LIMIT, build_http_client};
pub use domain::{AlbumMatch, CatalogAlbum, CatalogError, CatalogTrack, Credential};
pub use token::{AccessTokens, ClientCredentials, TokenCache, TokenExchange};
pub use traits::CatalogApi;
