//! Audio output using cpal.
//!
//! Each opened clip gets its own worker thread that:
//! - Fetches the clip over HTTP
//! - Decodes it in memory
//! - Resamples and remaps channels for the output device
//! - Plays it through a cpal output stream until it drains or is stopped

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use crossbeam_channel::Sender;
use parking_lot::{Mutex, MutexGuard, RwLock};

use super::PlaybackError;
use super::backend::{AudioBackend, AudioHandle};
use super::decoder::{decode_clip, extension_hint};
use super::resampler::{Resampler, map_channels};
use super::state::{ClipProgress, HandleId, PreviewEvent, PreviewEventKind};

/// How often the worker checks for stop requests and updates progress.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Upper bound on a downloaded clip.
const MAX_CLIP_BYTES: usize = 8 * 1024 * 1024;

/// How long a worker waits for the previous clip to release the device.
/// A stopped worker lets go within one `POLL_INTERVAL`.
const OUTPUT_WAIT: Duration = Duration::from_secs(2);

/// Exclusive claim on the output device, shared by all workers of a backend.
///
/// A worker holds the claim for as long as its stream exists, so a new clip
/// cannot start its stream until the previous one has been torn down.
#[derive(Clone, Default)]
struct OutputSlot(Arc<Mutex<()>>);

impl OutputSlot {
    /// Wait up to `wait` for the device. `Ok(None)` when `stop` was set
    /// while waiting.
    fn claim(
        &self,
        stop: &AtomicBool,
        wait: Duration,
    ) -> Result<Option<MutexGuard<'_, ()>>, PlaybackError> {
        let guard = self.0.try_lock_for(wait).ok_or_else(|| {
            PlaybackError::AudioInit("output still held by the previous preview".to_string())
        })?;
        if stop.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(guard))
    }
}

/// Backend that plays clips on the default output device.
pub struct DeviceBackend {
    runtime: tokio::runtime::Handle,
    http: reqwest::Client,
    volume: f32,
    output: OutputSlot,
}

impl DeviceBackend {
    /// `runtime` drives the clip downloads; workers block on it from their
    /// own threads, so it must not be a current-thread runtime that the
    /// caller is blocking.
    pub fn new(runtime: tokio::runtime::Handle, http: reqwest::Client) -> Self {
        Self {
            runtime,
            http,
            volume: 1.0,
            output: OutputSlot::default(),
        }
    }

    /// Set volume (0.0 - 1.0).
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }
}

impl AudioBackend for DeviceBackend {
    fn open(
        &mut self,
        id: HandleId,
        url: &str,
        events: Sender<PreviewEvent>,
    ) -> Result<Box<dyn AudioHandle>, PlaybackError> {
        let stop = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(RwLock::new(ClipProgress::default()));

        let worker = ClipWorker {
            id,
            url: url.to_string(),
            runtime: self.runtime.clone(),
            http: self.http.clone(),
            volume: self.volume,
            output: self.output.clone(),
            stop: Arc::clone(&stop),
            progress: Arc::clone(&progress),
            events,
        };

        let thread = thread::Builder::new()
            .name(format!("preview-{}", id.0))
            .spawn(move || worker.run())
            .map_err(|e| PlaybackError::AudioInit(e.to_string()))?;

        Ok(Box::new(DeviceHandle {
            stop,
            progress,
            thread: Some(thread),
        }))
    }
}

/// Handle to a clip worker.
pub struct DeviceHandle {
    stop: Arc<AtomicBool>,
    progress: Arc<RwLock<ClipProgress>>,
    thread: Option<JoinHandle<()>>,
}

impl AudioHandle for DeviceHandle {
    fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        // The worker may still be downloading; it exits on its own once it
        // sees the flag, so don't block the caller on it.
        self.thread.take();
    }

    fn progress(&self) -> ClipProgress {
        *self.progress.read()
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Everything a worker thread needs.
struct ClipWorker {
    id: HandleId,
    url: String,
    runtime: tokio::runtime::Handle,
    http: reqwest::Client,
    volume: f32,
    output: OutputSlot,
    stop: Arc<AtomicBool>,
    progress: Arc<RwLock<ClipProgress>>,
    events: Sender<PreviewEvent>,
}

impl ClipWorker {
    fn run(self) {
        let kind = match self.play() {
            Ok(true) => PreviewEventKind::Ended,
            Ok(false) => return, // Stopped by the controller
            Err(e) => {
                if self.stopped() {
                    return;
                }
                tracing::warn!("Preview {} failed: {}", self.id, e);
                PreviewEventKind::Failed(e.to_string())
            }
        };
        self.emit(kind);
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn emit(&self, kind: PreviewEventKind) {
        // Controller gone = nobody to tell
        let _ = self.events.send(PreviewEvent {
            handle: self.id,
            kind,
        });
    }

    /// Returns `Ok(true)` when the clip played to the end.
    fn play(&self) -> Result<bool, PlaybackError> {
        let bytes = self.runtime.block_on(fetch_clip(&self.http, &self.url))?;
        if self.stopped() {
            return Ok(false);
        }

        let clip = decode_clip(bytes, extension_hint(&self.url))?;

        // Released after `stream` below is dropped
        let Some(_claim) = self.output.claim(&self.stop, OUTPUT_WAIT)? else {
            return Ok(false);
        };

        let output = OutputDevice::open_default()?;
        let mut resampler = Resampler::new(clip.sample_rate, output.sample_rate, clip.channels)?;
        let resampled = if resampler.needs_resampling() {
            resampler.process_all(&clip.samples)?
        } else {
            clip.samples
        };
        let samples = Arc::new(map_channels(&resampled, clip.channels, output.channels));

        let frames = samples.len() / output.channels as usize;
        let duration = Duration::from_secs_f64(frames as f64 / output.sample_rate as f64);
        self.progress.write().duration = duration;

        if self.stopped() {
            return Ok(false);
        }

        let cursor = Arc::new(AtomicUsize::new(0));
        let stream = output.build_stream(Arc::clone(&samples), Arc::clone(&cursor), self.volume)?;
        stream
            .play()
            .map_err(|e| PlaybackError::AudioInit(e.to_string()))?;

        // Stopped while the stream was being opened
        if self.stopped() {
            return Ok(false);
        }

        tracing::debug!("Preview {} playing ({:.1}s)", self.id, duration.as_secs_f32());
        self.emit(PreviewEventKind::Ready);

        loop {
            if self.stopped() {
                return Ok(false);
            }

            let played = cursor.load(Ordering::Relaxed).min(samples.len());
            let position = Duration::from_secs_f64(
                (played / output.channels as usize) as f64 / output.sample_rate as f64,
            );
            self.progress.write().position = position;

            if played >= samples.len() {
                // Let the device drain its last buffer before the stream drops
                thread::sleep(POLL_INTERVAL);
                return Ok(true);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

async fn fetch_clip(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, PlaybackError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| PlaybackError::Fetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PlaybackError::Fetch(format!("HTTP {}", status.as_u16())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PlaybackError::Fetch(e.to_string()))?;
    if bytes.len() > MAX_CLIP_BYTES {
        return Err(PlaybackError::Fetch(format!(
            "clip too large ({} bytes)",
            bytes.len()
        )));
    }
    Ok(bytes.to_vec())
}

/// Default output device and its native format.
struct OutputDevice {
    device: Device,
    config: StreamConfig,
    format: SampleFormat,
    sample_rate: u32,
    channels: u16,
}

impl OutputDevice {
    fn open_default() -> Result<Self, PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlaybackError::AudioInit("No output device found".to_string()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| PlaybackError::AudioInit(e.to_string()))?;

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        tracing::debug!(
            "Audio device: {} ({}Hz, {} channels)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels
        );

        Ok(Self {
            config: StreamConfig {
                channels,
                sample_rate: supported.sample_rate(),
                buffer_size: cpal::BufferSize::Default,
            },
            format: supported.sample_format(),
            device,
            sample_rate,
            channels,
        })
    }

    fn build_stream(
        &self,
        samples: Arc<Vec<f32>>,
        cursor: Arc<AtomicUsize>,
        volume: f32,
    ) -> Result<Stream, PlaybackError> {
        let stream = match self.format {
            SampleFormat::F32 => build_stream::<f32>(&self.device, &self.config, samples, cursor, volume),
            SampleFormat::I16 => build_stream::<i16>(&self.device, &self.config, samples, cursor, volume),
            SampleFormat::U16 => build_stream::<u16>(&self.device, &self.config, samples, cursor, volume),
            format => {
                return Err(PlaybackError::AudioInit(format!(
                    "Unsupported sample format: {:?}",
                    format
                )));
            }
        };
        stream.map_err(|e| PlaybackError::AudioInit(e.to_string()))
    }
}

/// Build an output stream that copies from `samples` starting at `cursor`.
fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    samples: Arc<Vec<f32>>,
    cursor: Arc<AtomicUsize>,
    volume: f32,
) -> Result<Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let start = cursor.load(Ordering::Relaxed);
            let written = fill_output(data, &samples, start, volume);
            cursor.store(start + written, Ordering::Relaxed);
        },
        |err| {
            tracing::error!("Audio stream error: {}", err);
        },
        None,
    )
}

/// Copy samples from `start` into `out`, padding with silence past the end.
///
/// Returns how many source samples were consumed.
fn fill_output<T>(out: &mut [T], samples: &[f32], start: usize, volume: f32) -> usize
where
    T: cpal::Sample + cpal::FromSample<f32>,
{
    let available = samples.len().saturating_sub(start);
    let to_copy = available.min(out.len());

    for (dst, src) in out[..to_copy].iter_mut().zip(&samples[start..start + to_copy]) {
        *dst = T::from_sample(*src * volume);
    }
    for dst in &mut out[to_copy..] {
        *dst = T::from_sample(0.0f32);
    }
    to_copy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_output_copies_with_volume() {
        let samples = [0.5f32, -0.5, 1.0, -1.0];
        let mut out = [0.0f32; 2];
        assert_eq!(fill_output(&mut out, &samples, 0, 0.5), 2);
        assert_eq!(out, [0.25, -0.25]);
    }

    #[test]
    fn test_fill_output_pads_silence_at_end() {
        let samples = [0.5f32, 0.5, 0.5];
        let mut out = [1.0f32; 4];
        assert_eq!(fill_output(&mut out, &samples, 2, 1.0), 1);
        assert_eq!(out, [0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_fill_output_past_end() {
        let samples = [0.5f32];
        let mut out = [7i16; 2];
        assert_eq!(fill_output(&mut out, &samples, 5, 1.0), 0);
        assert_eq!(out, [0, 0]);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut handle = DeviceHandle {
            stop: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(RwLock::new(ClipProgress::default())),
            thread: None,
        };
        handle.stop();
        handle.stop();
        assert!(handle.stop.load(Ordering::SeqCst));
        assert_eq!(handle.progress(), ClipProgress::default());
    }

    #[test]
    fn test_output_claim_waits_for_previous_clip() {
        let slot = OutputSlot::default();
        let stop = AtomicBool::new(false);
        let (held_tx, held_rx) = crossbeam_channel::bounded(0);

        let previous = {
            let slot = slot.clone();
            thread::spawn(move || {
                let never_stopped = AtomicBool::new(false);
                let _claim = slot.claim(&never_stopped, OUTPUT_WAIT).unwrap().unwrap();
                held_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(100));
            })
        };

        held_rx.recv().unwrap();
        let started = std::time::Instant::now();
        let claim = slot.claim(&stop, OUTPUT_WAIT).unwrap();
        assert!(claim.is_some());
        assert!(started.elapsed() >= Duration::from_millis(50));
        previous.join().unwrap();
    }

    #[test]
    fn test_output_claim_times_out_while_held() {
        let slot = OutputSlot::default();
        let stop = AtomicBool::new(false);

        let _held = slot.claim(&stop, OUTPUT_WAIT).unwrap().unwrap();
        let second = slot.claim(&stop, Duration::from_millis(20));
        assert!(matches!(second, Err(PlaybackError::AudioInit(_))));
    }

    #[test]
    fn test_output_claim_skipped_after_stop() {
        let slot = OutputSlot::default();
        let stop = AtomicBool::new(true);

        assert!(slot.claim(&stop, OUTPUT_WAIT).unwrap().is_none());
        // Nothing left held
        let running = AtomicBool::new(false);
        assert!(slot.claim(&running, Duration::from_millis(20)).unwrap().is_some());
    }

    #[test]
    fn test_unreachable_clip_reports_failure() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut backend = DeviceBackend::new(runtime.handle().clone(), reqwest::Client::new());
        let (tx, rx) = crossbeam_channel::unbounded();

        let _handle = backend
            .open(HandleId(1), "http://127.0.0.1:9/clip.mp3", tx)
            .unwrap();

        let event = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(event.handle, HandleId(1));
        assert!(matches!(event.kind, PreviewEventKind::Failed(_)));
    }
}
