//! Matching listening-history albums to catalog albums.
//!
//! - `scoring` - pure normalization, scoring and ranking
//! - `resolver` - the end-to-end lookup for one album
//! - `rotation` - resolves a whole top-albums list

pub mod resolver;
pub mod rotation;
pub mod scoring;

pub use resolver::AlbumResolver;
pub use rotation::{Resolution, RotationEntry, RotationError, build_rotation, resolve_rotation};
pub use scoring::{ScoredCandidate, normalize, rank_candidates};
