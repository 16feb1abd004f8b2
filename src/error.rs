//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors ([`CatalogError`], [`HistoryError`],
//!   [`PlaybackError`], [`ConfigError`]) for detailed handling
//! - All errors implement `std::error::Error` for compatibility
//!
//! # Example
//!
//! ```ignore
//! use rotation_preview::error::{Result, ResultExt};
//!
//! async fn rotation(history: &LastFmClient) -> Result<Vec<ListeningRecord>> {
//!     let records = history.top_albums().await?; // HistoryError auto-converts
//!     Ok(records)
//! }
//! ```

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::history::HistoryError;
use crate::matching::RotationError;
use crate::preview::PlaybackError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Music catalog error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Listening history error
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Preview playback error
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl From<RotationError> for Error {
    fn from(e: RotationError) -> Self {
        match e {
            RotationError::History(e) => Error::History(e),
            RotationError::Catalog(e) => Error::Catalog(e),
        }
    }
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether the error comes from missing API credentials.
    pub fn is_missing_credentials(&self) -> bool {
        match self {
            Error::Catalog(CatalogError::MissingCredentials)
            | Error::History(HistoryError::MissingCredentials) => true,
            Error::WithContext { source, .. } => source.is_missing_credentials(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(ctx))
    }
}
