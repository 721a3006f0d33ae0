//! UI panels

mod canvas;
mod export;
mod studio;
mod tools;

pub use canvas::{CanvasAction, CanvasPanel};
pub use export::{ExportAction, ExportPanel};
pub use studio::{StudioAction, StudioPanel, StudioStatus};
pub use tools::{ToolsAction, ToolsPanel};
