//! Built-in playback effects

use std::fmt;

use tracing::warn;

use super::AudioEffect;
use crate::resample::resample_ratio;

/// Linear volume control
#[derive(Debug)]
pub struct GainEffect {
    gain: f32,
}

impl GainEffect {
    pub fn new(gain: f32) -> Self {
        Self { gain: gain.max(0.0) }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl AudioEffect for GainEffect {
    fn name(&self) -> &str { "Gain" }

    fn process(&mut self, samples: &mut Vec<f32>) {
        for sample in samples.iter_mut() {
            *sample *= self.gain;
        }
    }
}

/// Playback-rate style pitch shift: a ratio above 1 raises pitch and shortens the buffer
#[derive(Debug)]
pub struct PitchShiftEffect {
    ratio: f32,
}

impl PitchShiftEffect {
    pub fn new(ratio: f32) -> Self {
        Self { ratio: ratio.clamp(0.25, 4.0) }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }
}

impl AudioEffect for PitchShiftEffect {
    fn name(&self) -> &str { "Pitch Shift" }

    fn process(&mut self, samples: &mut Vec<f32>) {
        match resample_ratio(samples, 1.0 / self.ratio as f64) {
            Ok(shifted) => *samples = shifted,
            Err(e) => warn!(ratio = self.ratio, "Pitch shift skipped: {}", e),
        }
    }
}

/// Convolution reverb with a synthetic decaying-noise impulse, applied fully wet.
///
/// The impulse is velvet noise: one random-sign tap per short grid cell,
/// shaped by `(1 - t)^2` over its length and normalized to unit energy.
/// Sparse taps keep whole-buffer convolution cheap.
pub struct ImpulseReverbEffect {
    /// (offset in samples, amplitude)
    taps: Vec<(usize, f32)>,
    impulse_len: usize,
}

impl ImpulseReverbEffect {
    pub const DEFAULT_LENGTH_SECS: f32 = 0.5;
    const DEFAULT_DENSITY: f32 = 2000.0;

    pub fn new(sample_rate: f32) -> Self {
        Self::with_rng(sample_rate, fastrand::Rng::new())
    }

    /// Deterministic impulse for a given seed
    pub fn with_seed(sample_rate: f32, seed: u64) -> Self {
        Self::with_rng(sample_rate, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(sample_rate: f32, mut rng: fastrand::Rng) -> Self {
        let sample_rate = sample_rate.max(1.0);
        let len = ((Self::DEFAULT_LENGTH_SECS * sample_rate) as usize).max(1);
        let cell = ((sample_rate / Self::DEFAULT_DENSITY) as usize).max(1);

        let mut taps: Vec<(usize, f32)> = (0..len)
            .step_by(cell)
            .map(|start| {
                let offset = (start + rng.usize(0..cell)).min(len - 1);
                let sign = if rng.bool() { 1.0 } else { -1.0 };
                let decay = (1.0 - offset as f32 / len as f32).powi(2);
                (offset, sign * decay)
            })
            .collect();

        let energy: f32 = taps.iter().map(|(_, a)| a * a).sum();
        if energy > 0.0 {
            let norm = energy.sqrt();
            for (_, amp) in &mut taps {
                *amp /= norm;
            }
        }

        Self { taps, impulse_len: len }
    }

    pub fn impulse_len(&self) -> usize {
        self.impulse_len
    }

    pub fn taps(&self) -> &[(usize, f32)] {
        &self.taps
    }
}

impl fmt::Debug for ImpulseReverbEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpulseReverbEffect")
            .field("impulse_len", &self.impulse_len)
            .field("taps", &self.taps.len())
            .finish()
    }
}

impl AudioEffect for ImpulseReverbEffect {
    fn name(&self) -> &str { "Reverb" }

    fn process(&mut self, samples: &mut Vec<f32>) {
        if samples.is_empty() {
            return;
        }
        let mut wet = vec![0.0f32; samples.len() + self.impulse_len - 1];
        for &(offset, amp) in &self.taps {
            let out = &mut wet[offset..offset + samples.len()];
            for (o, &x) in out.iter_mut().zip(samples.iter()) {
                *o += x * amp;
            }
        }
        *samples = wet;
    }
}
