//! Sample rate conversion using rubato.
//!
//! Clips are mostly 44.1kHz while many output devices run at 48kHz. Playing
//! without conversion shifts pitch and speed.

use rubato::{FftFixedIn, Resampler as RubatoResampler};

use super::PlaybackError;

/// Frames per resampler chunk.
const CHUNK_SIZE: usize = 1024;

/// Audio resampler wrapper.
pub struct Resampler {
    resampler: Option<FftFixedIn<f32>>,
    input_rate: u32,
    output_rate: u32,
    channels: usize,
    /// Per-channel input waiting for a full chunk
    input_buffer: Vec<Vec<f32>>,
}

impl Resampler {
    /// Create a new resampler.
    ///
    /// If input and output rates match, no resampling is performed.
    pub fn new(input_rate: u32, output_rate: u32, channels: u16) -> Result<Self, PlaybackError> {
        let channels = channels as usize;
        if channels == 0 {
            return Err(PlaybackError::Resample("zero channels".to_string()));
        }

        let resampler = if input_rate == output_rate {
            None
        } else {
            let r = FftFixedIn::<f32>::new(
                input_rate as usize,
                output_rate as usize,
                CHUNK_SIZE,
                2,
                channels,
            )
            .map_err(|e| PlaybackError::Resample(e.to_string()))?;

            tracing::debug!(
                "Resampler: {}Hz → {}Hz ({} channels)",
                input_rate,
                output_rate,
                channels
            );
            Some(r)
        };

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
            channels,
            input_buffer: vec![Vec::new(); channels],
        })
    }

    /// Check if resampling is needed.
    pub fn needs_resampling(&self) -> bool {
        self.resampler.is_some()
    }

    /// Get the resampling ratio.
    pub fn ratio(&self) -> f64 {
        self.output_rate as f64 / self.input_rate as f64
    }

    /// Process interleaved samples, returning resampled interleaved output.
    ///
    /// Input that doesn't fill a whole chunk is kept for the next call.
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>, PlaybackError> {
        let Some(ref mut resampler) = self.resampler else {
            return Ok(input.to_vec());
        };

        // Deinterleave input into per-channel buffers
        for (i, sample) in input.iter().enumerate() {
            self.input_buffer[i % self.channels].push(*sample);
        }

        let mut output = Vec::new();

        while self.input_buffer[0].len() >= CHUNK_SIZE {
            let chunks: Vec<Vec<f32>> = self
                .input_buffer
                .iter_mut()
                .map(|ch| ch.drain(..CHUNK_SIZE).collect())
                .collect();

            let resampled = resampler
                .process(&chunks, None)
                .map_err(|e| PlaybackError::Resample(e.to_string()))?;
            interleave_into(&resampled, usize::MAX, &mut output);
        }

        Ok(output)
    }

    /// Flush any remaining samples in the buffer.
    /// Call this at end of stream.
    pub fn flush(&mut self) -> Result<Vec<f32>, PlaybackError> {
        let ratio = self.ratio();
        let Some(ref mut resampler) = self.resampler else {
            return Ok(Vec::new());
        };

        let remaining = self.input_buffer[0].len();
        if remaining == 0 {
            return Ok(Vec::new());
        }

        // Pad remaining samples to chunk size
        let pad_needed = CHUNK_SIZE - remaining;
        for ch in &mut self.input_buffer {
            ch.extend(std::iter::repeat_n(0.0, pad_needed));
        }

        let chunks = std::mem::replace(&mut self.input_buffer, vec![Vec::new(); self.channels]);
        let resampled = resampler
            .process(&chunks, None)
            .map_err(|e| PlaybackError::Resample(e.to_string()))?;

        // Only take the non-padded portion
        let expected_frames = (remaining as f64 * ratio).ceil() as usize;
        let mut output = Vec::new();
        interleave_into(&resampled, expected_frames, &mut output);
        Ok(output)
    }

    /// Resample a complete clip in one go.
    pub fn process_all(&mut self, input: &[f32]) -> Result<Vec<f32>, PlaybackError> {
        let mut output = self.process(input)?;
        output.extend(self.flush()?);
        Ok(output)
    }
}

fn interleave_into(planes: &[Vec<f32>], max_frames: usize, output: &mut Vec<f32>) {
    let Some(first) = planes.first() else {
        return;
    };
    let frames = first.len().min(max_frames);
    output.reserve(frames * planes.len());
    for frame in 0..frames {
        for plane in planes {
            output.push(plane[frame]);
        }
    }
}

/// Convert interleaved samples between channel layouts.
///
/// Downmixing to mono averages all input channels. Otherwise output channel
/// `c` takes input channel `c`, or the last input channel when there are
/// fewer (so mono fans out to every speaker).
pub fn map_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    let (from, to) = (from as usize, to as usize);
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let mut output = Vec::with_capacity(samples.len() / from * to);
    for frame in samples.chunks_exact(from) {
        if to == 1 {
            output.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            for c in 0..to {
                output.push(frame[c.min(from - 1)]);
            }
        }
    }
    output
}
