//! Microphone capture sessions with level metering

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver};
use thiserror::Error;
use tracing::{info, warn};

use crate::audio_input::{AudioInputError, AudioInputService, InputStreamHandle};
use crate::wav_codec::{encode_wav, CodecError};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Input error: {0}")]
    Input(#[from] AudioInputError),
    #[error("Encoding error: {0}")]
    Encode(#[from] CodecError),
}

impl CaptureError {
    /// Failures the user must resolve by granting microphone access
    pub fn is_access_problem(&self) -> bool {
        matches!(self, Self::Input(e) if e.is_access_problem())
    }
}

/// How to open a capture session
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Device name, or `"default"`
    pub device_id: String,
    /// Linear gain applied while capturing ("real-time" mode)
    pub live_gain: Option<f32>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: "default".to_string(),
            live_gain: None,
        }
    }
}

/// Shared metering state (lock-free reads from UI)
#[derive(Debug)]
pub struct MeterState {
    peak_raw: AtomicU32,
    rms_raw: AtomicU32,
    clipped: AtomicBool,
}

impl MeterState {
    fn new() -> Self {
        Self {
            peak_raw: AtomicU32::new(0),
            rms_raw: AtomicU32::new(0),
            clipped: AtomicBool::new(false),
        }
    }

    pub fn peak(&self) -> f32 {
        f32::from_bits(self.peak_raw.load(Ordering::Relaxed))
    }

    pub fn rms(&self) -> f32 {
        f32::from_bits(self.rms_raw.load(Ordering::Relaxed))
    }

    pub fn is_clipped(&self) -> bool {
        self.clipped.load(Ordering::Relaxed)
    }

    pub fn clear_clip(&self) {
        self.clipped.store(false, Ordering::Relaxed);
    }

    fn set_levels(&self, peak: f32, rms: f32) {
        self.peak_raw.store(peak.to_bits(), Ordering::Relaxed);
        self.rms_raw.store(rms.to_bits(), Ordering::Relaxed);
    }

    fn set_clipped(&self) {
        self.clipped.store(true, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.set_levels(0.0, 0.0);
        self.clipped.store(false, Ordering::Relaxed);
    }
}

impl Default for MeterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Finished capture, mono
#[derive(Debug, Clone)]
pub struct RecordedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RecordedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Encode as a 16-bit PCM WAV payload
    pub fn encode(&self) -> Result<Vec<u8>, CaptureError> {
        Ok(encode_wav(&self.samples, self.sample_rate)?)
    }
}

/// An open microphone plus the worker collecting its samples.
/// Dropping the session discards the capture.
pub struct CaptureSession {
    input: Option<InputStreamHandle>,
    worker: Option<JoinHandle<()>>,
    buffer: Arc<Mutex<Vec<f32>>>,
    meter: Arc<MeterState>,
    sample_rate: u32,
    started: Instant,
}

impl CaptureSession {
    pub fn start(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let (chunk_tx, chunk_rx) = bounded::<Vec<f32>>(64);
        let (input, sample_rate, channels) = AudioInputService::start_stream(&config.device_id, chunk_tx)?;

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let meter = Arc::new(MeterState::new());
        let gain = config.live_gain.unwrap_or(1.0);

        let worker = {
            let buffer = buffer.clone();
            let meter = meter.clone();
            thread::spawn(move || Self::process_loop(chunk_rx, buffer, meter, channels as usize, gain))
        };

        info!(
            device = %config.device_id,
            sample_rate,
            channels,
            live_gain = ?config.live_gain,
            "Capture started"
        );

        Ok(Self {
            input: Some(input),
            worker: Some(worker),
            buffer,
            meter,
            sample_rate,
            started: Instant::now(),
        })
    }

    pub fn meter(&self) -> Arc<MeterState> {
        self.meter.clone()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Close the device, drain the worker and hand back the captured audio
    pub fn stop(mut self) -> RecordedAudio {
        self.shutdown();
        let samples = self
            .buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default();

        info!(samples = samples.len(), sample_rate = self.sample_rate, "Capture stopped");

        RecordedAudio {
            samples,
            sample_rate: self.sample_rate,
            channels: 1,
        }
    }

    fn shutdown(&mut self) {
        // Dropping the stream closes the chunk channel, which ends the worker
        if let Some(input) = self.input.take() {
            input.stop();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Capture worker panicked");
            }
        }
        self.meter.reset();
    }

    fn process_loop(
        rx: Receiver<Vec<f32>>,
        buffer: Arc<Mutex<Vec<f32>>>,
        meter: Arc<MeterState>,
        channels: usize,
        gain: f32,
    ) {
        let mut peak_hold = 0.0f32;
        while let Ok(chunk) = rx.recv() {
            let mono = downmix(&chunk, channels, gain);
            if mono.is_empty() {
                continue;
            }

            let current_peak = mono.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
            peak_hold = f32::max(current_peak, peak_hold * 0.95);
            let rms = (mono.iter().map(|s| s * s).sum::<f32>() / mono.len() as f32).sqrt();
            meter.set_levels(peak_hold, rms);
            if current_peak > 1.0 {
                meter.set_clipped();
            }

            if let Ok(mut buf) = buffer.lock() {
                buf.extend_from_slice(&mono);
            }
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Average interleaved frames to mono and apply gain
fn downmix(chunk: &[f32], channels: usize, gain: f32) -> Vec<f32> {
    let channels = channels.max(1);
    chunk
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32 * gain)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo() {
        let mono = downmix(&[1.0, 0.0, 0.5, 0.5, -1.0, -1.0], 2, 1.0);
        assert_eq!(mono, vec![0.5, 0.5, -1.0]);
    }

    #[test]
    fn test_downmix_applies_gain() {
        assert_eq!(downmix(&[0.5, -0.5], 1, 0.5), vec![0.25, -0.25]);
    }

    #[test]
    fn test_worker_collects_and_meters() {
        let (tx, rx) = bounded(4);
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let meter = Arc::new(MeterState::new());
        let worker = {
            let buffer = buffer.clone();
            let meter = meter.clone();
            thread::spawn(move || CaptureSession::process_loop(rx, buffer, meter, 2, 1.0))
        };

        tx.send(vec![0.2, 0.2, 0.4, 0.4]).unwrap();
        tx.send(vec![1.5, 1.5]).unwrap();
        drop(tx);
        worker.join().unwrap();

        assert_eq!(*buffer.lock().unwrap(), vec![0.2, 0.4, 1.5]);
        assert!(meter.is_clipped());
        assert!(meter.peak() >= 1.0);
    }

    #[test]
    fn test_recorded_audio_encodes() {
        let audio = RecordedAudio {
            samples: vec![0.0; 800],
            sample_rate: 8000,
            channels: 1,
        };
        assert!((audio.duration_secs() - 0.1).abs() < 1e-9);
        let payload = audio.encode().unwrap();
        assert_eq!(&payload[..4], b"RIFF");
    }

    #[test]
    fn test_access_problem_classification() {
        assert!(CaptureError::Input(AudioInputError::DeviceUnavailable).is_access_problem());
        assert!(!CaptureError::Input(AudioInputError::StreamError("x".into())).is_access_problem());
    }
}
