//! Drawing tool configuration

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Tool variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Brush,
    Pencil,
    Eraser,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Brush, ToolKind::Pencil, ToolKind::Eraser];

    pub fn label(self) -> &'static str {
        match self {
            Self::Brush => "Brush",
            Self::Pencil => "Pencil",
            Self::Eraser => "Eraser",
        }
    }

    pub fn composite_mode(self) -> CompositeMode {
        match self {
            Self::Brush | Self::Pencil => CompositeMode::SourceOver,
            Self::Eraser => CompositeMode::DestinationOut,
        }
    }
}

/// How new paint combines with existing pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// Normal paint over existing pixels
    SourceOver,
    /// Remove existing pixels where the stroke covers them
    DestinationOut,
}

/// Active tool settings, read on every paint operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub kind: ToolKind,
    /// Stroke width in pixels
    pub stroke_width: f32,
    pub color: Rgb,
    /// Opacity percentage (0-100)
    pub opacity: u8,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            kind: ToolKind::Brush,
            stroke_width: 5.0,
            color: Rgb::BLACK,
            opacity: 100,
        }
    }
}

impl ToolConfig {
    pub const MIN_WIDTH: f32 = 1.0;
    pub const MAX_WIDTH: f32 = 50.0;
    pub const MIN_OPACITY: u8 = 10;
    pub const MAX_OPACITY: u8 = 100;

    pub fn with_kind(self, kind: ToolKind) -> Self {
        Self { kind, ..self }
    }

    pub fn with_color(self, color: Rgb) -> Self {
        Self { color, ..self }
    }

    pub fn with_width(self, stroke_width: f32) -> Self {
        Self { stroke_width: stroke_width.max(Self::MIN_WIDTH), ..self }
    }

    pub fn with_opacity(self, opacity: u8) -> Self {
        Self { opacity: opacity.min(100), ..self }
    }

    /// Width actually rasterized; the pencil draws at half width
    pub fn effective_width(&self) -> f32 {
        let width = self.stroke_width.max(Self::MIN_WIDTH);
        match self.kind {
            ToolKind::Pencil => (width / 2.0).max(1.0),
            ToolKind::Brush | ToolKind::Eraser => width,
        }
    }

    /// Opacity as 0.0-1.0 alpha
    pub fn alpha(&self) -> f32 {
        f32::from(self.opacity.min(100)) / 100.0
    }

    pub fn composite_mode(&self) -> CompositeMode {
        self.kind.composite_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pencil_draws_half_width() {
        let tool = ToolConfig::default().with_kind(ToolKind::Pencil).with_width(10.0);
        assert_eq!(tool.effective_width(), 5.0);
        let thin = tool.with_width(1.0);
        assert_eq!(thin.effective_width(), 1.0);
        assert_eq!(tool.with_kind(ToolKind::Brush).effective_width(), 10.0);
    }

    #[test]
    fn test_composite_modes() {
        assert_eq!(ToolKind::Brush.composite_mode(), CompositeMode::SourceOver);
        assert_eq!(ToolKind::Pencil.composite_mode(), CompositeMode::SourceOver);
        assert_eq!(ToolKind::Eraser.composite_mode(), CompositeMode::DestinationOut);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let tool = ToolConfig::default().with_opacity(250);
        assert_eq!(tool.opacity, 100);
        assert_eq!(ToolConfig::default().with_opacity(45).alpha(), 0.45);
    }

    #[test]
    fn test_tool_config_serde() {
        let tool = ToolConfig::default().with_kind(ToolKind::Eraser);
        let json = serde_json::to_string(&tool).unwrap();
        let back: ToolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tool);
    }
}
