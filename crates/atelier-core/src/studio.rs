//! Audio studio state machine

use crate::beat::BeatPreset;
use crate::playback::PlaybackSettings;
use crate::recording::{RecordingId, RecordingLibrary};

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
}

/// Most recent finished capture, not yet saved to the library
#[derive(Debug, Clone)]
pub struct Take {
    pub payload: Vec<u8>,
    pub duration_secs: f64,
}

/// Widget-local studio state. Devices live in the services layer; this only
/// tracks what the user has done.
#[derive(Debug)]
pub struct StudioState {
    capture: CaptureState,
    take: Option<Take>,
    /// Title used for the next save/download
    pub title: String,
    pub preset: BeatPreset,
    beat_playing: bool,
    pub settings: PlaybackSettings,
    pub library: RecordingLibrary,
}

impl Default for StudioState {
    fn default() -> Self {
        Self::new()
    }
}

impl StudioState {
    pub fn new() -> Self {
        Self {
            capture: CaptureState::Idle,
            take: None,
            title: RecordingLibrary::DEFAULT_NAME.to_string(),
            preset: BeatPreset::default(),
            beat_playing: false,
            settings: PlaybackSettings::default(),
            library: RecordingLibrary::new(),
        }
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture
    }

    pub fn is_capturing(&self) -> bool {
        self.capture == CaptureState::Capturing
    }

    /// Enter the capturing state. Returns false if already capturing.
    pub fn begin_capture(&mut self) -> bool {
        if self.is_capturing() {
            return false;
        }
        self.capture = CaptureState::Capturing;
        true
    }

    /// Leave the capturing state with a finished payload, replacing any unsaved take
    pub fn finish_capture(&mut self, payload: Vec<u8>, duration_secs: f64) {
        self.capture = CaptureState::Idle;
        self.take = Some(Take { payload, duration_secs });
    }

    /// Leave the capturing state without a payload (device failure)
    pub fn abort_capture(&mut self) {
        self.capture = CaptureState::Idle;
    }

    pub fn take(&self) -> Option<&Take> {
        self.take.as_ref()
    }

    pub fn discard_take(&mut self) -> Option<Take> {
        self.take.take()
    }

    /// Move the take into the library under the current title and suggest the next title
    pub fn save_take(&mut self) -> Option<RecordingId> {
        let take = self.take.take()?;
        let id = self.library.add(self.title.clone(), take.payload, take.duration_secs);
        self.title = self.library.next_default_name();
        Some(id)
    }

    pub fn is_beat_playing(&self) -> bool {
        self.beat_playing
    }

    /// Flip the beat loop flag and return the new value
    pub fn toggle_beat(&mut self) -> bool {
        self.beat_playing = !self.beat_playing;
        self.beat_playing
    }

    pub fn stop_beat(&mut self) {
        self.beat_playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_transitions() {
        let mut studio = StudioState::new();
        assert!(studio.begin_capture());
        assert!(!studio.begin_capture());
        studio.finish_capture(vec![1, 2, 3], 0.5);
        assert_eq!(studio.capture_state(), CaptureState::Idle);
        assert_eq!(studio.take().map(|t| t.payload.len()), Some(3));
    }

    #[test]
    fn test_abort_keeps_previous_take() {
        let mut studio = StudioState::new();
        studio.begin_capture();
        studio.finish_capture(vec![7], 0.1);
        studio.begin_capture();
        studio.abort_capture();
        assert!(!studio.is_capturing());
        assert_eq!(studio.take().map(|t| t.payload.clone()), Some(vec![7]));
    }

    #[test]
    fn test_save_take_moves_into_library() {
        let mut studio = StudioState::new();
        assert_eq!(studio.save_take(), None);

        studio.begin_capture();
        studio.finish_capture(vec![0; 4], 1.0);
        let id = studio.save_take().unwrap();

        assert!(studio.take().is_none());
        assert_eq!(studio.library.get(id).map(|r| r.name.as_str()), Some("My Recording"));
        assert_eq!(studio.title, "My Recording 1");
    }

    #[test]
    fn test_beat_toggle() {
        let mut studio = StudioState::new();
        assert!(studio.toggle_beat());
        assert!(!studio.toggle_beat());
        studio.toggle_beat();
        studio.stop_beat();
        assert!(!studio.is_beat_playing());
    }
}
