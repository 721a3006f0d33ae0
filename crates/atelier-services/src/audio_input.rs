//! Microphone / line input streams

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, StreamConfig};
use crossbeam_channel::Sender;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum AudioInputError {
    #[error("No audio input devices found")]
    NoDevices,
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    #[error("Input device unavailable or access denied")]
    DeviceUnavailable,
    #[error("Failed to get input config: {0}")]
    ConfigError(String),
    #[error("Failed to build input stream: {0}")]
    StreamError(String),
}

impl AudioInputError {
    /// Whether the user can fix this by granting access / plugging in a device
    pub fn is_access_problem(&self) -> bool {
        matches!(self, Self::NoDevices | Self::DeviceUnavailable | Self::DeviceNotFound(_))
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioInputError {
    fn from(e: cpal::DefaultStreamConfigError) -> Self {
        match e {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => Self::DeviceUnavailable,
            other => Self::ConfigError(other.to_string()),
        }
    }
}

impl From<cpal::BuildStreamError> for AudioInputError {
    fn from(e: cpal::BuildStreamError) -> Self {
        match e {
            cpal::BuildStreamError::DeviceNotAvailable => Self::DeviceUnavailable,
            other => Self::StreamError(other.to_string()),
        }
    }
}

/// Keeps an input stream alive; dropping it closes the device
pub struct InputStreamHandle {
    stop_flag: Arc<AtomicBool>,
    _stream: cpal::Stream,
}

impl InputStreamHandle {
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

impl Drop for InputStreamHandle {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

pub struct AudioInputService;

impl AudioInputService {
    /// Resolve a device by name, or the host default for `"default"`
    fn find_device(device_id: &str) -> Result<Device, AudioInputError> {
        let host = cpal::default_host();

        if device_id == "default" {
            return host.default_input_device().ok_or(AudioInputError::NoDevices);
        }

        host.input_devices()
            .map_err(|e| AudioInputError::ConfigError(e.to_string()))?
            .find(|d| d.name().is_ok_and(|name| name == device_id))
            .ok_or_else(|| AudioInputError::DeviceNotFound(device_id.to_string()))
    }

    /// Open a device and forward interleaved f32 chunks to `chunk_tx`.
    /// Returns (handle, sample_rate, channels).
    pub fn start_stream(
        device_id: &str,
        chunk_tx: Sender<Vec<f32>>,
    ) -> Result<(InputStreamHandle, u32, u16), AudioInputError> {
        let device = Self::find_device(device_id)?;
        let config = device.default_input_config()?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate,
            channels,
            "Opening audio input stream"
        );

        let stop_flag = Arc::new(AtomicBool::new(false));
        let stream_config: StreamConfig = config.config();

        let stream = match config.sample_format() {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &stream_config, chunk_tx, stop_flag.clone()),
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &stream_config, chunk_tx, stop_flag.clone()),
            SampleFormat::I32 => Self::build_stream::<i32>(&device, &stream_config, chunk_tx, stop_flag.clone()),
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &stream_config, chunk_tx, stop_flag.clone()),
            format => return Err(AudioInputError::ConfigError(format!("Unsupported format: {format:?}"))),
        }?;

        stream.play().map_err(|e| AudioInputError::StreamError(e.to_string()))?;

        Ok((InputStreamHandle { stop_flag, _stream: stream }, sample_rate, channels))
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        tx: Sender<Vec<f32>>,
        stop_flag: Arc<AtomicBool>,
    ) -> Result<cpal::Stream, AudioInputError>
    where
        T: cpal::Sample + cpal::SizedSample + Send + 'static,
        f32: FromSample<T>,
    {
        let stream = device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if stop_flag.load(Ordering::SeqCst) {
                    return;
                }
                let chunk: Vec<f32> = data.iter().map(|s| f32::from_sample_(*s)).collect();
                let _ = tx.try_send(chunk);
            },
            |err| error!("Input stream error: {}", err),
            None,
        )?;
        Ok(stream)
    }
}
