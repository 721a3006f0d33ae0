//! Drawing canvas: texture display and pointer-to-stroke mapping

use atelier_core::{DrawingSurface, Point};
use egui::{pos2, Color32, ColorImage, Rect, Sense, Stroke, TextureHandle, TextureOptions, Ui, Vec2};

/// Stroke input produced by the canvas this frame
pub enum CanvasAction {
    None,
    Begin(Point),
    Extend(Point),
    End,
}

pub struct CanvasPanel {
    texture: Option<TextureHandle>,
    uploaded_revision: Option<u64>,
    uploaded_size: (u32, u32),
    drawing: bool,
}

impl CanvasPanel {
    pub fn new() -> Self {
        Self {
            texture: None,
            uploaded_revision: None,
            uploaded_size: (0, 0),
            drawing: false,
        }
    }

    /// Re-upload the pixel buffer when the surface changed since the last frame
    fn sync_texture(&mut self, ui: &Ui, surface: &DrawingSurface) {
        let size = (surface.width(), surface.height());
        if self.uploaded_revision == Some(surface.revision()) && self.uploaded_size == size && self.texture.is_some() {
            return;
        }

        let buffer = surface.buffer();
        let image = ColorImage::from_rgba_unmultiplied(
            [buffer.width() as usize, buffer.height() as usize],
            buffer.as_rgba(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(ui.ctx().load_texture("drawing_surface", image, TextureOptions::LINEAR));
            }
        }
        self.uploaded_revision = Some(surface.revision());
        self.uploaded_size = size;
    }

    pub fn ui(&mut self, ui: &mut Ui, surface: &DrawingSurface) -> CanvasAction {
        self.sync_texture(ui, surface);

        let canvas_size = Vec2::new(surface.width() as f32, surface.height() as f32);
        let available = ui.available_size();
        let scale = (available.x / canvas_size.x).min(available.y / canvas_size.y).clamp(0.1, 1.0);

        let (rect, response) = ui.allocate_exact_size(canvas_size * scale, Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        // Erased pixels show this gray
        painter.rect_filled(rect, 0.0, Color32::from_gray(200));
        if let Some(texture) = &self.texture {
            painter.image(texture.id(), rect, Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)), Color32::WHITE);
        }
        painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::from_gray(120)), egui::StrokeKind::Inside);

        let pointer = response.interact_pointer_pos().or_else(|| response.hover_pos());
        let to_canvas = |pos: egui::Pos2| {
            let local = (pos - rect.min) / scale;
            Point::new(local.x, local.y)
        };

        if response.is_pointer_button_down_on() {
            if let Some(pos) = pointer {
                if !rect.contains(pos) {
                    return self.finish();
                }
                let point = to_canvas(pos);
                if self.drawing {
                    return CanvasAction::Extend(point);
                }
                self.drawing = true;
                return CanvasAction::Begin(point);
            }
        }

        if self.drawing {
            return self.finish();
        }

        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
        }
        CanvasAction::None
    }

    fn finish(&mut self) -> CanvasAction {
        if !self.drawing {
            return CanvasAction::None;
        }
        self.drawing = false;
        CanvasAction::End
    }
}
