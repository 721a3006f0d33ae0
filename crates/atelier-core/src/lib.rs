//! atelier-core: Domain types for the atelier drawing surface and audio studio

pub mod beat;
mod color;
mod error;
mod history;
mod pixels;
mod playback;
mod recording;
mod studio;
mod surface;
mod tool;

pub use beat::{BeatPattern, BeatPreset, StepCounter, PATTERN_STEPS};
pub use color::{Rgb, PALETTE};
pub use error::{AtelierError, Result};
pub use history::HistoryBuffer;
pub use pixels::{PixelBuffer, Point, StrokeLayer};
pub use playback::PlaybackSettings;
pub use recording::{Recording, RecordingId, RecordingLibrary};
pub use studio::{CaptureState, StudioState, Take};
pub use surface::{DrawingSurface, CANVAS_COMPACT, CANVAS_DEFAULT, DEFAULT_HISTORY_CAPACITY};
pub use tool::{CompositeMode, ToolConfig, ToolKind};
