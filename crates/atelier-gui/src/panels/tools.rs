//! Tool selection, stroke settings, palette and history controls

use atelier_core::{Rgb, ToolConfig, ToolKind, CANVAS_COMPACT, CANVAS_DEFAULT, PALETTE};
use egui::{Color32, RichText, Sense, Slider, Stroke, Ui, Vec2};

/// Actions that can be triggered from the tools panel
pub enum ToolsAction {
    None,
    SetTool(ToolConfig),
    Undo,
    Redo,
    Clear,
    Resize(u32, u32),
}

pub struct ToolsPanel {
    hex_text: String,
}

impl ToolsPanel {
    pub fn new() -> Self {
        Self { hex_text: Rgb::BLACK.to_hex() }
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        tool: &ToolConfig,
        can_undo: bool,
        can_redo: bool,
        size: (u32, u32),
    ) -> ToolsAction {
        let mut action = ToolsAction::None;
        let mut next = *tool;

        ui.heading("Tools");
        ui.horizontal(|ui| {
            for kind in ToolKind::ALL {
                if ui.selectable_label(tool.kind == kind, kind.label()).clicked() {
                    next = next.with_kind(kind);
                }
            }
        });

        ui.separator();

        let mut width = tool.stroke_width;
        ui.add(Slider::new(&mut width, ToolConfig::MIN_WIDTH..=ToolConfig::MAX_WIDTH).text("Size"));
        if width != tool.stroke_width {
            next = next.with_width(width);
        }

        let mut opacity = tool.opacity;
        ui.add(
            Slider::new(&mut opacity, ToolConfig::MIN_OPACITY..=ToolConfig::MAX_OPACITY)
                .step_by(5.0)
                .suffix("%")
                .text("Opacity"),
        );
        if opacity != tool.opacity {
            next = next.with_opacity(opacity);
        }

        ui.separator();
        ui.label("Color");
        if let Some(color) = palette_grid(ui, tool.color) {
            next = next.with_color(color);
            self.hex_text = color.to_hex();
        }

        ui.horizontal(|ui| {
            let response = ui.add(egui::TextEdit::singleline(&mut self.hex_text).desired_width(80.0));
            if response.lost_focus() {
                match self.hex_text.parse::<Rgb>() {
                    Ok(color) => next = next.with_color(color),
                    Err(_) => self.hex_text = tool.color.to_hex(),
                }
            }
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(18.0), Sense::hover());
            ui.painter().rect_filled(rect, 2.0, to_color32(next.color));
        });

        ui.separator();
        ui.horizontal(|ui| {
            if ui.add_enabled(can_undo, egui::Button::new("\u{21B6} Undo")).clicked() {
                action = ToolsAction::Undo;
            }
            if ui.add_enabled(can_redo, egui::Button::new("\u{21B7} Redo")).clicked() {
                action = ToolsAction::Redo;
            }
            if ui.button(RichText::new("Clear").color(Color32::from_rgb(200, 80, 80))).clicked() {
                action = ToolsAction::Clear;
            }
        });

        ui.separator();
        ui.label("Canvas");
        ui.horizontal(|ui| {
            for (label, dims) in [("800 × 600", CANVAS_DEFAULT), ("400 × 300", CANVAS_COMPACT)] {
                if ui.selectable_label(size == dims, label).clicked() && size != dims {
                    action = ToolsAction::Resize(dims.0, dims.1);
                }
            }
        });

        if matches!(action, ToolsAction::None) && next != *tool {
            action = ToolsAction::SetTool(next);
        }
        action
    }
}

/// Swatch grid; returns the clicked color
fn palette_grid(ui: &mut Ui, current: Rgb) -> Option<Rgb> {
    let mut picked = None;
    egui::Grid::new("palette").spacing(Vec2::splat(3.0)).show(ui, |ui| {
        for (i, &color) in PALETTE.iter().enumerate() {
            let (rect, response) = ui.allocate_exact_size(Vec2::splat(20.0), Sense::click());
            ui.painter().rect_filled(rect, 3.0, to_color32(color));
            if color == current {
                ui.painter().rect_stroke(rect, 3.0, Stroke::new(2.0, Color32::from_rgb(80, 160, 255)), egui::StrokeKind::Outside);
            }
            if response.on_hover_text(color.to_hex()).clicked() {
                picked = Some(color);
            }
            if (i + 1) % 6 == 0 {
                ui.end_row();
            }
        }
    });
    picked
}

fn to_color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}
