//! Listening history integration (Last.fm)
//!
//! Supplies the listener's recent top albums. Each album is later matched
//! against the catalog to find a playable preview.
//!
//! API docs: https://www.last.fm/api

pub mod adapter;
mod client;
pub mod domain;
pub mod dto;
pub mod traits;

pub use client::{DEFAULT_LIMIT, DEFAULT_PERIOD, LastFmClient};
pub use domain::{ArtworkSize, HistoryError, ListeningRecord};
pub use traits::ListeningHistoryApi;
