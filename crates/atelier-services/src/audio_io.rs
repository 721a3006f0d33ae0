//! Audio output: one-shot buffer playback and realtime callback streams

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use crossbeam_channel::{bounded, Receiver};
use thiserror::Error;
use tracing::{error, info};

use crate::resample::resample;

#[derive(Debug, Error)]
pub enum AudioOutputError {
    #[error("No audio output devices found")]
    NoDevices,
    #[error("Failed to get default output config: {0}")]
    ConfigError(String),
    #[error("Failed to build output stream: {0}")]
    StreamError(String),
    #[error("Playback failed: {0}")]
    PlaybackError(String),
}

/// A running one-shot playback. Dropping it closes the stream.
pub struct PlaybackHandle {
    done_rx: Receiver<()>,
    stopped: Arc<AtomicBool>,
    _stream: cpal::Stream,
}

impl PlaybackHandle {
    pub fn is_done(&self) -> bool {
        self.stopped.load(Ordering::SeqCst) || !self.done_rx.is_empty()
    }

    /// Silence immediately
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

pub struct AudioOutputService;

impl AudioOutputService {
    /// Play mono f32 samples through the default output device
    pub fn play_samples(samples: Vec<f32>, sample_rate: u32) -> Result<PlaybackHandle, AudioOutputError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioOutputError::NoDevices)?;

        let supported_config = device
            .default_output_config()
            .map_err(|e| AudioOutputError::ConfigError(e.to_string()))?;

        let device_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels() as usize;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = device_rate,
            channels,
            frames = samples.len(),
            "Starting playback"
        );

        let resampled = resample(&samples, sample_rate, device_rate).map_err(AudioOutputError::PlaybackError)?;

        // Fan mono out to every device channel
        let interleaved: Arc<Vec<f32>> = Arc::new(
            resampled
                .iter()
                .flat_map(|&s| std::iter::repeat_n(s.clamp(-1.0, 1.0), channels))
                .collect(),
        );
        let total = interleaved.len();
        let position = Arc::new(AtomicUsize::new(0));
        let stopped = Arc::new(AtomicBool::new(false));

        let config: StreamConfig = supported_config.into();
        let stream = {
            let position = position.clone();
            let stopped = stopped.clone();
            let interleaved = interleaved.clone();
            device
                .build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        if stopped.load(Ordering::SeqCst) {
                            data.fill(0.0);
                            return;
                        }
                        let pos = position.load(Ordering::SeqCst);
                        for (i, out) in data.iter_mut().enumerate() {
                            *out = interleaved.get(pos + i).copied().unwrap_or(0.0);
                        }
                        position.store((pos + data.len()).min(total), Ordering::SeqCst);
                    },
                    |err| error!("Playback stream error: {}", err),
                    None,
                )
                .map_err(|e| AudioOutputError::StreamError(e.to_string()))?
        };

        stream.play().map_err(|e| AudioOutputError::StreamError(e.to_string()))?;

        let (done_tx, done_rx) = bounded(1);
        let monitor_stopped = stopped.clone();
        thread::spawn(move || {
            let duration = total as f64 / (device_rate as f64 * channels.max(1) as f64);
            let timeout = Duration::from_secs_f64(duration + 0.5);
            let start = Instant::now();
            while start.elapsed() < timeout
                && position.load(Ordering::SeqCst) < total
                && !monitor_stopped.load(Ordering::SeqCst)
            {
                thread::sleep(Duration::from_millis(50));
            }
            let _ = done_tx.send(());
        });

        Ok(PlaybackHandle { done_rx, stopped, _stream: stream })
    }
}

/// Output stream that pulls interleaved samples from a callback
pub struct RealtimeOutputStream {
    stop_flag: Arc<AtomicBool>,
    sample_rate: u32,
    _stream: cpal::Stream,
}

impl RealtimeOutputStream {
    /// Start a stream on the default device. The callback receives
    /// (interleaved buffer, sample_rate, channels).
    pub fn start<F>(sample_callback: F) -> Result<Self, AudioOutputError>
    where
        F: FnMut(&mut [f32], u32, u16) + Send + 'static,
    {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioOutputError::NoDevices)?;

        let supported_config = device
            .default_output_config()
            .map_err(|e| AudioOutputError::ConfigError(e.to_string()))?;

        let sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels();

        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();

        let config: StreamConfig = supported_config.into();
        let callback = Mutex::new(sample_callback);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if stop_clone.load(Ordering::SeqCst) {
                        data.fill(0.0);
                        return;
                    }
                    let Ok(mut cb) = callback.lock() else {
                        data.fill(0.0);
                        return;
                    };
                    cb(data, sample_rate, channels);
                },
                |err| error!("Output stream error: {}", err),
                None,
            )
            .map_err(|e| AudioOutputError::StreamError(e.to_string()))?;

        stream.play().map_err(|e| AudioOutputError::StreamError(e.to_string()))?;

        info!(sample_rate, channels, "Started realtime output stream");

        Ok(Self { stop_flag, sample_rate, _stream: stream })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for RealtimeOutputStream {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}
