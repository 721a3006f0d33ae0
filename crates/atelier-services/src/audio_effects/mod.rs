//! Playback effect chain

mod native;

pub use native::{GainEffect, ImpulseReverbEffect, PitchShiftEffect};

use std::fmt::Debug;

use atelier_core::PlaybackSettings;

/// Offline effect over a whole mono buffer
pub trait AudioEffect: Send + Debug {
    fn name(&self) -> &str;
    /// Process in place; time-based effects may change the buffer length
    fn process(&mut self, samples: &mut Vec<f32>);
}

/// Chain of audio effects processed in order
#[derive(Debug, Default)]
pub struct EffectChain {
    effects: Vec<Box<dyn AudioEffect>>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Volume only, or pitch shift -> reverb -> volume when enhancement is on
    pub fn for_playback(settings: &PlaybackSettings, sample_rate: u32) -> Self {
        let mut chain = Self::new();
        if settings.enhance {
            chain.add(Box::new(PitchShiftEffect::new(settings.pitch_ratio())));
            chain.add(Box::new(ImpulseReverbEffect::new(sample_rate as f32)));
        }
        chain.add(Box::new(GainEffect::new(settings.gain())));
        chain
    }

    pub fn add(&mut self, effect: Box<dyn AudioEffect>) {
        self.effects.push(effect);
    }

    pub fn process(&mut self, samples: &mut Vec<f32>) {
        for effect in &mut self.effects {
            effect.process(samples);
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
