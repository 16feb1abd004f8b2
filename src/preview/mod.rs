//! Single-slot preview player.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │               PreviewController (caller's thread)            │
//! │   play / pause / on_gesture, owns the one live AudioHandle   │
//! └───────────────┬──────────────────────────────▲───────────────┘
//!                 │ AudioBackend::open           │ crossbeam channel
//!                 ▼                              │ (Ready/Ended/Failed)
//! ┌──────────────────────────────────────────────┴───────────────┐
//! │            Clip worker (one thread per handle)               │
//! │     HTTP fetch → symphonia decode → rubato → cpal stream     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! State machine:
//!
//! ```text
//! Idle ──play(i)──▶ Loading(i) ──Ready──▶ Playing(i)
//!   ▲                  │                     │
//!   └──Failed/pause────┘◀──────Ended/pause───┘
//! ```
//!
//! `play(j)` from any state stops and drops the current handle before the
//! next one is opened, so at most one clip is ever audible.

mod audio;
mod backend;
mod decoder;
mod resampler;
mod state;

pub use audio::DeviceBackend;
pub use backend::{AudioBackend, AudioHandle};
pub use state::{
    ClipProgress, Gesture, HandleId, PreviewEvent, PreviewEventKind, PreviewSource, PreviewStatus,
    format_duration,
};

#[cfg(test)]
pub use backend::mocks;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::matching::RotationEntry;

/// The handle currently holding the slot.
struct Slot {
    id: HandleId,
    index: usize,
    handle: Box<dyn AudioHandle>,
}

/// Plays at most one album preview at a time.
pub struct PreviewController {
    backend: Box<dyn AudioBackend>,
    sources: Vec<PreviewSource>,
    status: PreviewStatus,
    slot: Option<Slot>,
    next_handle: u64,
    events_tx: Sender<PreviewEvent>,
    events_rx: Receiver<PreviewEvent>,
}

impl PreviewController {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            backend,
            sources: Vec::new(),
            status: PreviewStatus::Idle,
            slot: None,
            next_handle: 1,
            events_tx,
            events_rx,
        }
    }

    /// Current state of the slot.
    pub fn status(&self) -> PreviewStatus {
        self.status
    }

    pub fn sources(&self) -> &[PreviewSource] {
        &self.sources
    }

    /// Progress of the playing clip, if one is playing.
    pub fn progress(&self) -> Option<ClipProgress> {
        match (self.status, &self.slot) {
            (PreviewStatus::Playing(_), Some(slot)) => Some(slot.handle.progress()),
            _ => None,
        }
    }

    /// Replace all sources. Stops whatever is playing.
    pub fn set_previews(&mut self, sources: Vec<PreviewSource>) {
        self.pause();
        self.sources = sources;
    }

    /// Replace all sources from a resolved rotation.
    pub fn set_rotation(&mut self, entries: &[RotationEntry]) {
        self.set_previews(entries.iter().map(|e| PreviewSource::from(&e.resolution)).collect());
    }

    /// Update one album's source as its resolution arrives.
    ///
    /// Stops playback when the active album loses the URL it was playing.
    pub fn update_preview(&mut self, index: usize, source: PreviewSource) {
        if index >= self.sources.len() {
            self.sources.resize(index + 1, PreviewSource::Pending);
        }
        if self.status.index() == Some(index) && self.sources[index] != source {
            self.pause();
        }
        self.sources[index] = source;
    }

    /// Start the preview for `index`.
    ///
    /// No-op unless the album has an available clip, and no-op when that
    /// album already owns the slot. The backend is called before this returns.
    pub fn play(&mut self, index: usize) {
        if self.status.index() == Some(index) {
            return;
        }

        let Some(url) = self.sources.get(index).and_then(|s| s.url()).map(str::to_string) else {
            tracing::debug!("No preview available for album {}", index);
            return;
        };

        self.release_slot();

        let id = HandleId(self.next_handle);
        self.next_handle += 1;

        match self.backend.open(id, &url, self.events_tx.clone()) {
            Ok(handle) => {
                tracing::debug!("Opened preview {} for album {}", id, index);
                self.slot = Some(Slot { id, index, handle });
                self.status = PreviewStatus::Loading(index);
            }
            Err(e) => {
                // Autoplay refusals and missing devices are not user-facing
                tracing::debug!("Preview for album {} failed to start: {}", index, e);
                self.status = PreviewStatus::Idle;
            }
        }
    }

    /// Stop playback. Safe to call when idle.
    pub fn pause(&mut self) {
        self.release_slot();
        self.status = PreviewStatus::Idle;
    }

    /// Handle a play-button press.
    ///
    /// Pointer presses are ignored while that album is still loading. Touch
    /// presses always toggle.
    pub fn on_gesture(&mut self, index: usize, gesture: Gesture) {
        let owns_slot = self.status.index() == Some(index);
        match gesture {
            Gesture::Pointer if self.status.is_loading(index) => {}
            _ if owns_slot => self.pause(),
            _ => self.play(index),
        }
    }

    /// Apply all queued lifecycle events. Returns how many changed state.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.apply(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until the next event arrives, then apply it and any backlog.
    pub fn wait_event(&mut self, timeout: std::time::Duration) -> usize {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => usize::from(self.apply(event)) + self.process_events(),
            Err(_) => 0,
        }
    }

    fn apply(&mut self, event: PreviewEvent) -> bool {
        let Some(ref slot) = self.slot else {
            tracing::trace!("Discarding event for {} with empty slot", event.handle);
            return false;
        };
        if slot.id != event.handle {
            tracing::trace!("Discarding stale event for {}", event.handle);
            return false;
        }

        let index = slot.index;
        match event.kind {
            PreviewEventKind::Ready => {
                if self.status == PreviewStatus::Loading(index) {
                    self.status = PreviewStatus::Playing(index);
                    return true;
                }
                false
            }
            PreviewEventKind::Ended => {
                tracing::debug!("Preview for album {} finished", index);
                self.pause();
                true
            }
            PreviewEventKind::Failed(reason) => {
                tracing::debug!("Preview for album {} failed: {}", index, reason);
                self.pause();
                true
            }
        }
    }

    fn release_slot(&mut self) {
        if let Some(mut slot) = self.slot.take() {
            slot.handle.stop();
        }
    }
}

impl Drop for PreviewController {
    fn drop(&mut self) {
        self.release_slot();
    }
}

/// Playback errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlaybackError {
    #[error("Audio output initialization failed: {0}")]
    AudioInit(String),

    #[error("Failed to fetch preview: {0}")]
    Fetch(String),

    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Resampling failed: {0}")]
    Resample(String),
}
