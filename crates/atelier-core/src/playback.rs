//! Playback and capture settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Output volume percentage (0-100)
    pub volume: u8,
    /// Route playback through pitch shift + reverb
    pub enhance: bool,
    /// Pitch shift amount (0-100, 50 = unchanged)
    pub tune_amount: u8,
    /// Apply the volume gain while capturing
    pub live_gain: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 70,
            enhance: false,
            tune_amount: 50,
            live_gain: false,
        }
    }
}

impl PlaybackSettings {
    /// Linear gain from the volume percentage
    pub fn gain(&self) -> f32 {
        f32::from(self.volume.min(100)) / 100.0
    }

    /// Playback-rate ratio for the enhancement chain (0.75 - 1.25)
    pub fn pitch_ratio(&self) -> f32 {
        1.0 + (f32::from(self.tune_amount.min(100)) - 50.0) / 200.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_ratio_range() {
        let mut settings = PlaybackSettings::default();
        assert_eq!(settings.pitch_ratio(), 1.0);
        settings.tune_amount = 0;
        assert_eq!(settings.pitch_ratio(), 0.75);
        settings.tune_amount = 100;
        assert_eq!(settings.pitch_ratio(), 1.25);
        settings.tune_amount = 255;
        assert_eq!(settings.pitch_ratio(), 1.25);
    }

    #[test]
    fn test_gain_from_volume() {
        let settings = PlaybackSettings::default();
        assert_eq!(settings.gain(), 0.7);
        let muted = PlaybackSettings { volume: 0, ..settings };
        assert_eq!(muted.gain(), 0.0);
    }
}
