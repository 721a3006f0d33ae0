//! Percussive tone synthesis for the beat loop

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::audio_io::{AudioOutputError, RealtimeOutputStream};
use crate::beat_loop::ToneSink;

const START_HZ: f64 = 60.0;
const END_HZ: f64 = 20.0;
const SWEEP_SECS: f64 = 0.1;
const START_GAIN: f64 = 0.3;
const END_GAIN: f64 = 0.01;
const LENGTH_SECS: f64 = 0.2;
const MAX_VOICES: usize = 16;

/// Sine kick: exponential pitch drop 60 -> 20 Hz over 0.1s,
/// exponential gain decay 0.3 -> 0.01 over 0.2s, then silence.
#[derive(Debug, Clone)]
pub struct KickVoice {
    sample_rate: f64,
    length: usize,
    age: usize,
    phase: f64,
}

impl KickVoice {
    pub fn new(sample_rate: u32) -> Self {
        let sample_rate = f64::from(sample_rate.max(1));
        Self {
            sample_rate,
            length: (LENGTH_SECS * sample_rate).round() as usize,
            age: 0,
            phase: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.age < self.length
    }

    pub fn frequency_at(t: f64) -> f64 {
        if t >= SWEEP_SECS {
            return END_HZ;
        }
        START_HZ * (END_HZ / START_HZ).powf(t / SWEEP_SECS)
    }

    pub fn gain_at(t: f64) -> f64 {
        if t >= LENGTH_SECS {
            return 0.0;
        }
        START_GAIN * (END_GAIN / START_GAIN).powf(t / LENGTH_SECS)
    }

    pub fn tick(&mut self) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        let t = self.age as f64 / self.sample_rate;
        let out = self.phase.sin() * Self::gain_at(t);
        self.phase = (self.phase + TAU * Self::frequency_at(t) / self.sample_rate) % TAU;
        self.age += 1;
        out as f32
    }

    /// Render one complete hit
    pub fn render(sample_rate: u32) -> Vec<f32> {
        let mut voice = Self::new(sample_rate);
        std::iter::from_fn(|| voice.is_active().then(|| voice.tick())).collect()
    }
}

/// Polyphonic kick mixer shared between the beat timer and an output callback
#[derive(Debug, Clone)]
pub struct VoiceMixer {
    voices: Arc<Mutex<Vec<KickVoice>>>,
    sample_rate: Arc<AtomicU32>,
}

impl VoiceMixer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            voices: Arc::new(Mutex::new(Vec::new())),
            sample_rate: Arc::new(AtomicU32::new(sample_rate)),
        }
    }

    /// Mixer wired to the default output device
    pub fn open_output() -> Result<(Self, RealtimeOutputStream), AudioOutputError> {
        let mixer = Self::new(44100);
        let render_mixer = mixer.clone();
        let stream = RealtimeOutputStream::start(move |buffer, sample_rate, channels| {
            render_mixer.sample_rate.store(sample_rate, Ordering::Relaxed);
            render_mixer.render(buffer, channels as usize);
        })?;
        mixer.sample_rate.store(stream.sample_rate(), Ordering::Relaxed);
        Ok((mixer, stream))
    }

    pub fn active_voices(&self) -> usize {
        self.voices.lock().map(|v| v.len()).unwrap_or(0)
    }

    /// Mix active voices into an interleaved buffer, dropping finished ones
    pub fn render(&self, buffer: &mut [f32], channels: usize) {
        buffer.fill(0.0);
        let Ok(mut voices) = self.voices.lock() else {
            return;
        };
        if voices.is_empty() {
            return;
        }
        for frame in buffer.chunks_mut(channels.max(1)) {
            let mixed: f32 = voices.iter_mut().map(KickVoice::tick).sum();
            frame.fill(mixed.clamp(-1.0, 1.0));
        }
        voices.retain(KickVoice::is_active);
    }
}

impl ToneSink for VoiceMixer {
    fn trigger(&self) {
        let rate = self.sample_rate.load(Ordering::Relaxed);
        let Ok(mut voices) = self.voices.lock() else {
            return;
        };
        if voices.len() >= MAX_VOICES {
            voices.remove(0);
        }
        voices.push(KickVoice::new(rate));
        debug!(voices = voices.len(), "Kick triggered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kick_length() {
        let hit = KickVoice::render(1000);
        assert_eq!(hit.len(), 200);
        assert!(hit.iter().all(|s| s.abs() <= 0.3 + 1e-6));
    }

    #[test]
    fn test_sweep_and_envelope_endpoints() {
        assert_eq!(KickVoice::frequency_at(0.0), 60.0);
        assert!((KickVoice::frequency_at(0.1) - 20.0).abs() < 1e-9);
        assert_eq!(KickVoice::frequency_at(0.15), 20.0);
        assert!((KickVoice::gain_at(0.0) - 0.3).abs() < 1e-9);
        assert!((KickVoice::gain_at(0.2 - 1e-9) - 0.01).abs() < 1e-6);
        assert_eq!(KickVoice::gain_at(0.25), 0.0);
    }

    #[test]
    fn test_kick_is_audible() {
        let hit = KickVoice::render(44100);
        let peak = hit.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.1);
    }

    #[test]
    fn test_mixer_drops_finished_voices() {
        let mixer = VoiceMixer::new(1000);
        mixer.trigger();
        mixer.trigger();
        assert_eq!(mixer.active_voices(), 2);

        let mut buffer = vec![0.0; 100 * 2];
        mixer.render(&mut buffer, 2);
        assert_eq!(mixer.active_voices(), 2);
        // Stereo frames carry the same sample
        assert!(buffer.chunks(2).all(|f| f[0] == f[1]));

        let mut rest = vec![0.0; 200];
        mixer.render(&mut rest, 1);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_mixer_voice_cap() {
        let mixer = VoiceMixer::new(1000);
        for _ in 0..(MAX_VOICES + 4) {
            mixer.trigger();
        }
        assert_eq!(mixer.active_voices(), MAX_VOICES);
    }
}
