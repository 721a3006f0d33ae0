//! Background beat patterns

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Steps per pattern (eighth notes over one 4/4 bar)
pub const PATTERN_STEPS: usize = 8;

/// Built-in beat styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BeatPreset {
    #[default]
    HipHop,
    Rock,
    Electronic,
    Trap,
}

impl BeatPreset {
    pub const ALL: [BeatPreset; 4] = [Self::HipHop, Self::Rock, Self::Electronic, Self::Trap];

    pub fn label(self) -> &'static str {
        match self {
            Self::HipHop => "Hip-Hop",
            Self::Rock => "Rock",
            Self::Electronic => "Electronic",
            Self::Trap => "Trap",
        }
    }

    pub fn pattern(self) -> BeatPattern {
        let (bpm, steps) = match self {
            Self::HipHop => (90.0, [1, 0, 1, 0, 1, 0, 1, 0]),
            Self::Rock => (120.0, [1, 1, 0, 1, 1, 1, 0, 1]),
            Self::Electronic => (128.0, [1, 0, 0, 1, 1, 0, 0, 1]),
            Self::Trap => (140.0, [1, 0, 1, 0, 0, 1, 0, 1]),
        };
        BeatPattern::new(bpm, steps.map(|s| s == 1))
    }
}

/// Tempo plus a fixed-length onset sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeatPattern {
    /// Tempo in BPM
    pub bpm: f64,
    pub onsets: [bool; PATTERN_STEPS],
}

impl BeatPattern {
    pub fn new(bpm: f64, onsets: [bool; PATTERN_STEPS]) -> Self {
        Self { bpm, onsets }
    }

    /// Time between steps: one eighth note at the pattern tempo
    pub fn step_interval(&self) -> Duration {
        let bpm = if self.bpm.is_finite() && self.bpm > 0.0 { self.bpm } else { 120.0 };
        Duration::from_secs_f64(60.0 / bpm / 2.0)
    }

    pub fn active_steps(&self) -> usize {
        self.onsets.iter().filter(|&&on| on).count()
    }
}

/// Walks a pattern one step per timer tick, wrapping at the end
#[derive(Debug, Clone, Default)]
pub struct StepCounter {
    index: usize,
}

impl StepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step the next tick will play
    pub fn index(&self) -> usize {
        self.index
    }

    /// Consume one tick. Returns the step played and whether it has an onset.
    pub fn advance(&mut self, pattern: &BeatPattern) -> (usize, bool) {
        let step = self.index;
        let hit = pattern.onsets[step % PATTERN_STEPS];
        self.index = (step + 1) % PATTERN_STEPS;
        (step, hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_tempos_and_onsets() {
        assert_eq!(BeatPreset::HipHop.pattern().bpm, 90.0);
        assert_eq!(BeatPreset::Rock.pattern().active_steps(), 6);
        assert_eq!(BeatPreset::Electronic.pattern().onsets, [true, false, false, true, true, false, false, true]);
        assert_eq!(BeatPreset::Trap.pattern().bpm, 140.0);
    }

    #[test]
    fn test_step_interval_is_eighth_note() {
        // 120 BPM -> 500ms per beat -> 250ms per eighth
        assert_eq!(BeatPreset::Rock.pattern().step_interval(), Duration::from_millis(250));
        let hip_hop = BeatPreset::HipHop.pattern().step_interval().as_secs_f64();
        assert!((hip_hop - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_tempo_falls_back() {
        let pattern = BeatPattern::new(0.0, [false; PATTERN_STEPS]);
        assert_eq!(pattern.step_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_step_counter_wraps() {
        let pattern = BeatPreset::Trap.pattern();
        let mut counter = StepCounter::new();
        let hits: Vec<bool> = (0..PATTERN_STEPS * 2).map(|_| counter.advance(&pattern).1).collect();
        assert_eq!(&hits[..PATTERN_STEPS], &pattern.onsets);
        assert_eq!(&hits[PATTERN_STEPS..], &pattern.onsets);
        assert_eq!(counter.index(), 0);
    }
}
