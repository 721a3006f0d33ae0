//! Drawing title and image export controls

use std::path::Path;

use atelier_services::ImageFormat;
use egui::{RichText, Ui};

pub enum ExportAction {
    None,
    ExportImage(ImageFormat),
    ChooseFolder,
    OpenFolder,
}

pub struct ExportPanel {
    pub title: String,
    format: ImageFormat,
}

impl ExportPanel {
    pub fn new() -> Self {
        Self {
            title: "My Artwork".to_string(),
            format: ImageFormat::Png,
        }
    }

    pub fn ui(&mut self, ui: &mut Ui, export_dir: &Path, last_export: Option<&Path>) -> ExportAction {
        let mut action = ExportAction::None;

        ui.heading("Export");
        ui.horizontal(|ui| {
            ui.label("Title");
            ui.text_edit_singleline(&mut self.title);
        });

        ui.horizontal(|ui| {
            for format in ImageFormat::ALL {
                ui.radio_value(&mut self.format, format, format.label());
            }
            if ui.button("Save image").clicked() {
                action = ExportAction::ExportImage(self.format);
            }
        });

        ui.horizontal(|ui| {
            ui.label(RichText::new(export_dir.display().to_string()).small().weak());
            if ui.small_button("Change…").clicked() {
                action = ExportAction::ChooseFolder;
            }
            if ui.small_button("Open").on_hover_text("Open export folder").clicked() {
                action = ExportAction::OpenFolder;
            }
        });

        if let Some(path) = last_export {
            ui.label(RichText::new(format!("Saved {}", path.display())).small());
        }

        action
    }
}
