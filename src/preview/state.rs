//! Preview state and event types.

use std::time::Duration;

use crate::matching::Resolution;

/// What the single preview slot is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewStatus {
    #[default]
    Idle,
    /// Clip for this album index is being fetched/opened
    Loading(usize),
    Playing(usize),
}

impl PreviewStatus {
    /// Album index owning the slot, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            PreviewStatus::Idle => None,
            PreviewStatus::Loading(i) | PreviewStatus::Playing(i) => Some(*i),
        }
    }

    pub fn is_playing(&self, index: usize) -> bool {
        *self == PreviewStatus::Playing(index)
    }

    pub fn is_loading(&self, index: usize) -> bool {
        *self == PreviewStatus::Loading(index)
    }
}

/// Playable clip for one album, as far as we know.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewSource {
    /// Resolver hasn't answered yet
    #[default]
    Pending,
    /// No match, or a match without a clip
    Unavailable,
    Available(String),
}

impl PreviewSource {
    pub fn url(&self) -> Option<&str> {
        match self {
            PreviewSource::Available(url) => Some(url),
            _ => None,
        }
    }
}

impl From<&Resolution> for PreviewSource {
    fn from(resolution: &Resolution) -> Self {
        match resolution {
            Resolution::Pending => PreviewSource::Pending,
            Resolution::NoMatch => PreviewSource::Unavailable,
            Resolution::Matched(m) => match m.preview_url {
                Some(ref url) => PreviewSource::Available(url.clone()),
                None => PreviewSource::Unavailable,
            },
        }
    }
}

/// How the user asked for playback.
///
/// Touch input has no hover/click distinction, so it toggles unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Pointer,
    Touch,
}

/// Identifies one opened audio handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle notification from an audio handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEvent {
    pub handle: HandleId,
    pub kind: PreviewEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEventKind {
    /// Audio is flowing
    Ready,
    /// Clip played to the end
    Ended,
    Failed(String),
}

/// Position within the playing clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipProgress {
    pub position: Duration,
    pub duration: Duration,
}

impl ClipProgress {
    /// Position as a fraction (0.0 - 1.0).
    pub fn fraction(&self) -> f32 {
        if self.duration.is_zero() {
            0.0
        } else {
            (self.position.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }

    /// "M:SS / M:SS"
    pub fn display(&self) -> String {
        format!(
            "{} / {}",
            format_duration(self.position),
            format_duration(self.duration)
        )
    }
}

/// Format a duration as MM:SS or HH:MM:SS.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::album_match;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0:00");
        assert_eq!(format_duration(Duration::from_secs(30)), "0:30");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1:01:01");
    }

    #[test]
    fn test_progress() {
        let progress = ClipProgress {
            position: Duration::from_secs(15),
            duration: Duration::from_secs(30),
        };
        assert!((progress.fraction() - 0.5).abs() < 0.01);
        assert_eq!(progress.display(), "0:15 / 0:30");
        assert_eq!(ClipProgress::default().fraction(), 0.0);
    }

    #[test]
    fn test_status_index() {
        assert_eq!(PreviewStatus::Idle.index(), None);
        assert_eq!(PreviewStatus::Loading(2).index(), Some(2));
        assert!(PreviewStatus::Playing(1).is_playing(1));
        assert!(!PreviewStatus::Loading(1).is_playing(1));
    }

    #[test]
    fn test_source_from_resolution() {
        assert_eq!(PreviewSource::from(&Resolution::Pending), PreviewSource::Pending);
        assert_eq!(PreviewSource::from(&Resolution::NoMatch), PreviewSource::Unavailable);
        assert_eq!(
            PreviewSource::from(&Resolution::Matched(album_match("a", None))),
            PreviewSource::Unavailable
        );
        assert_eq!(
            PreviewSource::from(&Resolution::Matched(album_match("a", Some("https://clip")))),
            PreviewSource::Available("https://clip".to_string())
        );
    }
}
