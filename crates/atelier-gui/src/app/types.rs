use std::sync::Arc;

use atelier_services::{RealtimeOutputStream, VoiceMixer};

/// Kick synth wired to an open output device; the stream closes on drop
pub(super) struct ToneOutput {
    pub mixer: Arc<VoiceMixer>,
    pub _stream: RealtimeOutputStream,
}

/// One-line feedback shown in the status bar
pub(super) enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(s) | Self::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
