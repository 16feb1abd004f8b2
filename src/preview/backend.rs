//! Audio backend seam.
//!
//! The controller only knows how to open a clip and stop it again. Whether
//! that drives a sound card ([`DeviceBackend`](super::DeviceBackend)) or a
//! test double is decided by whoever builds the controller.

use crossbeam_channel::Sender;

use super::PlaybackError;
use super::state::{ClipProgress, HandleId, PreviewEvent};

/// Opens preview clips.
pub trait AudioBackend: Send {
    /// Start playing `url`.
    ///
    /// Must return promptly: fetching and decoding happen in the background
    /// and are reported as [`PreviewEvent`]s tagged with `id` on `events`.
    fn open(
        &mut self,
        id: HandleId,
        url: &str,
        events: Sender<PreviewEvent>,
    ) -> Result<Box<dyn AudioHandle>, PlaybackError>;
}

/// A clip that has been opened.
pub trait AudioHandle: Send {
    /// Stop output and release the device. Idempotent.
    fn stop(&mut self);

    fn progress(&self) -> ClipProgress;
}
