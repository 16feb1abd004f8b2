//! In-memory clip decoding using symphonia.
//!
//! Preview clips are short (about 30 seconds), so the whole clip is fetched
//! and decoded up front into interleaved f32 samples.
//!
//! Supported formats:
//! - MP3 (what the catalog serves)
//! - AAC (in MP4 container)
//! - OGG Vorbis
//! - WAV/PCM

use std::io::Cursor;
use std::time::Duration;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::PlaybackError;

/// A fully decoded clip.
#[derive(Debug, Clone)]
pub struct DecodedClip {
    /// Interleaved samples [L, R, L, R, ...]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedClip {
    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Decode a complete clip held in memory.
///
/// `extension` is a format hint (e.g. "mp3"); probing still works without one.
pub fn decode_clip(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedClip, PlaybackError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| PlaybackError::UnsupportedFormat(e.to_string()))?;

    let mut reader = probed.format;

    // Find the first audio track
    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlaybackError::UnsupportedFormat("No audio track found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PlaybackError::Decode(e.to_string()))?;

    let mut samples = Vec::new();
    let mut buffer: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match reader.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break; // End of stream
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(PlaybackError::Decode(e.to_string())),
        };

        // Skip packets from other tracks
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => continue, // Skip bad frame
            Err(e) => return Err(PlaybackError::Decode(e.to_string())),
        };

        // The decoded spec is authoritative; container headers can be missing
        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count() as u16;

        // SampleBuffer capacity counts samples across all channels
        let frames = decoded.capacity();
        let needed = frames * spec.channels.count();
        if buffer.as_ref().is_none_or(|b| b.capacity() < needed) {
            buffer = Some(SampleBuffer::new(frames as u64, spec));
        }
        if let Some(ref mut buf) = buffer {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    if samples.is_empty() || channels == 0 || sample_rate == 0 {
        return Err(PlaybackError::Decode("Clip contains no audio".to_string()));
    }

    tracing::debug!(
        "Decoded clip: {}Hz, {} channels, {} samples",
        sample_rate,
        channels,
        samples.len()
    );

    Ok(DecodedClip {
        samples,
        sample_rate,
        channels,
    })
}

/// File extension hint from a clip URL, ignoring any query string.
pub fn extension_hint(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    let last = path.rsplit('/').next()?;
    let (_, ext) = last.rsplit_once('.')?;
    (!ext.is_empty() && ext.len() <= 4).then_some(ext)
}
