//! Drawing surface: pixel buffer, active tool, and undo history

use crate::color::Rgb;
use crate::history::HistoryBuffer;
use crate::pixels::{PixelBuffer, Point, StrokeLayer};
use crate::tool::ToolConfig;

/// Default canvas size (width, height)
pub const CANVAS_DEFAULT: (u32, u32) = (800, 600);
/// Canvas size for small windows
pub const CANVAS_COMPACT: (u32, u32) = (400, 300);
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// Stroke being dragged out; the buffer shows `base` plus the layer
#[derive(Debug)]
struct ActiveStroke {
    base: PixelBuffer,
    layer: StrokeLayer,
}

#[derive(Debug)]
pub struct DrawingSurface {
    buffer: PixelBuffer,
    background: Rgb,
    tool: ToolConfig,
    history: HistoryBuffer<PixelBuffer>,
    active: Option<ActiveStroke>,
    /// Bumped on every visible buffer change
    revision: u64,
}

impl DrawingSurface {
    /// Blank white canvas; the history is seeded with the blank snapshot
    pub fn new(width: u32, height: u32, history_capacity: usize) -> Self {
        let background = Rgb::WHITE;
        let buffer = PixelBuffer::new(width, height, background);
        Self {
            history: HistoryBuffer::seeded(history_capacity, buffer.clone()),
            buffer,
            background,
            tool: ToolConfig::default(),
            active: None,
            revision: 0,
        }
    }

    /// Discard everything and start over with a blank canvas of the given size
    pub fn reset(&mut self, width: u32, height: u32) {
        let capacity = self.history.capacity();
        let tool = self.tool;
        let revision = self.revision;
        *self = Self::new(width, height, capacity);
        self.tool = tool;
        self.revision = revision + 1;
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn tool(&self) -> &ToolConfig {
        &self.tool
    }

    pub fn set_tool(&mut self, tool: ToolConfig) {
        self.tool = tool;
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn history(&self) -> &HistoryBuffer<PixelBuffer> {
        &self.history
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_stroking(&self) -> bool {
        self.active.is_some()
    }

    /// Composite a finished path onto the buffer. Does not snapshot.
    pub fn apply_stroke(&mut self, points: &[Point], tool: &ToolConfig) {
        if points.is_empty() {
            return;
        }
        self.buffer.stroke(points, tool);
        self.revision += 1;
    }

    /// Capture the buffer into the history
    pub fn snapshot(&mut self) {
        self.history.push(self.buffer.clone());
    }

    /// Start an interactive stroke with the current tool
    pub fn begin_stroke(&mut self, at: Point) {
        self.cancel_stroke();
        let base = self.buffer.clone();
        let layer = StrokeLayer::begin(at, self.tool, &base, &mut self.buffer);
        self.active = Some(ActiveStroke { base, layer });
        self.revision += 1;
    }

    /// Add a sample to the active stroke; ignored when no stroke is active
    pub fn extend_stroke(&mut self, to: Point) {
        let Some(stroke) = self.active.as_mut() else {
            return;
        };
        if stroke.layer.last() == to {
            return;
        }
        stroke.layer.extend(to, &stroke.base, &mut self.buffer);
        self.revision += 1;
    }

    /// Commit the active stroke and snapshot. Returns false when no stroke was active.
    pub fn end_stroke(&mut self) -> bool {
        if self.active.take().is_none() {
            return false;
        }
        self.snapshot();
        true
    }

    /// Drop the active stroke and restore the buffer it started from
    pub fn cancel_stroke(&mut self) {
        if let Some(stroke) = self.active.take() {
            self.buffer = stroke.base;
            self.revision += 1;
        }
    }

    /// Restore the previous snapshot. No-op at the oldest entry.
    pub fn undo(&mut self) -> bool {
        self.cancel_stroke();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.buffer.copy_from(snapshot);
        self.revision += 1;
        true
    }

    /// Restore the next snapshot. No-op at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.cancel_stroke();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.buffer.copy_from(snapshot);
        self.revision += 1;
        true
    }

    /// Fill with the background color and snapshot
    pub fn clear(&mut self) {
        self.cancel_stroke();
        self.buffer.fill(self.background);
        self.revision += 1;
        self.snapshot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolKind;

    fn surface() -> DrawingSurface {
        DrawingSurface::new(40, 30, DEFAULT_HISTORY_CAPACITY)
    }

    fn draw(surface: &mut DrawingSurface, y: f32) {
        surface.begin_stroke(Point::new(5.0, y));
        surface.extend_stroke(Point::new(20.0, y));
        surface.extend_stroke(Point::new(35.0, y + 2.0));
        assert!(surface.end_stroke());
    }

    #[test]
    fn test_new_surface_has_blank_snapshot() {
        let s = surface();
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history().cursor(), Some(0));
        assert_eq!(s.buffer().pixel(0, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_n_commits_give_n_plus_one_snapshots() {
        let mut s = surface();
        for n in 0..7 {
            draw(&mut s, 3.0 + n as f32 * 3.0);
        }
        assert_eq!(s.history().len(), 8);
        assert_eq!(s.history().cursor(), Some(7));
    }

    #[test]
    fn test_undo_then_redo_is_pixel_identical() {
        let mut s = surface();
        draw(&mut s, 10.0);
        draw(&mut s, 20.0);
        let before = s.buffer().clone();

        assert!(s.undo());
        assert_ne!(s.buffer(), &before);
        assert!(s.redo());
        assert_eq!(s.buffer(), &before);
    }

    #[test]
    fn test_boundary_undo_redo_are_noops() {
        let mut s = surface();
        let rev = s.revision();
        assert!(!s.undo());
        assert!(!s.redo());
        assert_eq!(s.revision(), rev);

        draw(&mut s, 10.0);
        let drawn = s.buffer().clone();
        assert!(!s.redo());
        assert_eq!(s.buffer(), &drawn);
        assert_eq!(s.history().cursor(), Some(1));
    }

    #[test]
    fn test_stroke_after_undo_discards_future() {
        // blank (0) -> A (1) -> undo -> B replaces A
        let mut s = surface();
        let blank = s.buffer().clone();

        draw(&mut s, 10.0);
        assert_eq!(s.history().cursor(), Some(1));

        assert!(s.undo());
        assert_eq!(s.history().cursor(), Some(0));
        assert_eq!(s.buffer(), &blank);

        draw(&mut s, 20.0);
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.history().cursor(), Some(1));
        let with_b = s.buffer().clone();
        assert!(!s.redo());
        assert_eq!(s.buffer(), &with_b);
    }

    #[test]
    fn test_clear_fills_and_snapshots() {
        let mut s = surface();
        draw(&mut s, 10.0);
        s.clear();
        assert_eq!(s.history().len(), 3);
        assert!(s.buffer().as_rgba().iter().all(|&b| b == 255));
        assert!(s.undo());
        assert!(s.buffer().as_rgba().iter().any(|&b| b != 255));
    }

    #[test]
    fn test_first_move_sample_is_drawn() {
        let mut s = surface();
        s.set_tool(ToolConfig::default().with_width(2.0));
        s.begin_stroke(Point::new(5.0, 5.0));
        s.extend_stroke(Point::new(30.0, 5.0));
        // Midpoint between the two samples is painted
        assert_eq!(s.buffer().pixel(17, 5).map(|p| p[0]), Some(0));
    }

    #[test]
    fn test_in_progress_stroke_does_not_compound_opacity() {
        let mut s = surface();
        s.set_tool(ToolConfig::default().with_width(6.0).with_opacity(50));
        s.begin_stroke(Point::new(5.0, 10.0));
        s.extend_stroke(Point::new(10.0, 10.0));
        s.extend_stroke(Point::new(15.0, 10.0));
        s.extend_stroke(Point::new(20.0, 10.0));
        s.end_stroke();

        let mut direct = DrawingSurface::new(40, 30, 4);
        direct.apply_stroke(
            &[Point::new(5.0, 10.0), Point::new(10.0, 10.0), Point::new(15.0, 10.0), Point::new(20.0, 10.0)],
            &ToolConfig::default().with_width(6.0).with_opacity(50),
        );
        assert_eq!(s.buffer(), direct.buffer());
    }

    #[test]
    fn test_long_interactive_stroke_matches_one_shot() {
        let tool = ToolConfig::default().with_width(9.0).with_opacity(35).with_color(Rgb::new(200, 40, 90));
        // Spiral that crosses itself many times
        let path: Vec<Point> = (0..600)
            .map(|i| {
                let t = i as f32 * 0.05;
                let r = 4.0 + t * 0.4;
                Point::new(60.0 + r * t.cos(), 45.0 + r * t.sin())
            })
            .collect();

        let mut s = DrawingSurface::new(120, 90, 4);
        s.set_tool(tool);
        s.begin_stroke(path[0]);
        for &p in &path[1..] {
            s.extend_stroke(p);
        }
        s.end_stroke();

        let mut direct = DrawingSurface::new(120, 90, 4);
        direct.apply_stroke(&path, &tool);
        assert_eq!(s.buffer(), direct.buffer());
    }

    #[test]
    fn test_interactive_eraser_matches_one_shot() {
        let eraser = ToolConfig::default().with_kind(ToolKind::Eraser).with_width(7.0).with_opacity(60);
        let path = [Point::new(3.0, 3.0), Point::new(30.0, 25.0), Point::new(8.0, 25.0), Point::new(30.0, 3.0)];

        let mut s = surface();
        s.set_tool(eraser);
        s.begin_stroke(path[0]);
        for &p in &path[1..] {
            s.extend_stroke(p);
        }

        let mut direct = surface();
        direct.apply_stroke(&path, &eraser);
        assert_eq!(s.buffer(), direct.buffer());
    }

    #[test]
    fn test_undo_cancels_active_stroke() {
        let mut s = surface();
        draw(&mut s, 10.0);
        let committed = s.buffer().clone();
        s.set_tool(ToolConfig::default().with_kind(ToolKind::Eraser).with_width(10.0));
        s.begin_stroke(Point::new(20.0, 10.0));
        assert!(s.is_stroking());
        assert!(s.undo());
        assert!(!s.is_stroking());
        assert_ne!(s.buffer(), &committed);
        assert!(s.redo());
        assert_eq!(s.buffer(), &committed);
    }

    #[test]
    fn test_end_without_stroke_is_noop() {
        let mut s = surface();
        assert!(!s.end_stroke());
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_history_capacity_bounds_memory() {
        let mut s = DrawingSurface::new(40, 30, 3);
        for n in 0..5 {
            draw(&mut s, 4.0 + n as f32 * 4.0);
        }
        assert_eq!(s.history().len(), 3);
        assert!(s.undo());
        assert!(s.undo());
        assert!(!s.undo());
    }

    #[test]
    fn test_reset_keeps_tool_and_reseeds_history() {
        let mut s = surface();
        s.set_tool(ToolConfig::default().with_kind(ToolKind::Pencil));
        draw(&mut s, 10.0);
        let before = s.revision();
        s.reset(CANVAS_COMPACT.0, CANVAS_COMPACT.1);
        assert!(s.revision() > before);
        assert_eq!((s.width(), s.height()), CANVAS_COMPACT);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.tool().kind, ToolKind::Pencil);
    }
}
