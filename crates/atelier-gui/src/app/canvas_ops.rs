use std::path::PathBuf;

use anyhow::Context as _;
use atelier_services::{export_image, ImageFormat};

use super::config::save_config;
use super::types::Notice;
use super::AtelierApp;
use crate::panels::{CanvasAction, ExportAction, ToolsAction};

impl AtelierApp {
    pub(super) fn handle_canvas_action(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::Begin(point) => self.surface.begin_stroke(point),
            CanvasAction::Extend(point) => self.surface.extend_stroke(point),
            CanvasAction::End => {
                if self.surface.end_stroke() {
                    tracing::debug!(cursor = ?self.surface.history().cursor(), "Stroke committed");
                }
            }
            CanvasAction::None => {}
        }
    }

    pub(super) fn handle_tools_action(&mut self, action: ToolsAction) {
        match action {
            ToolsAction::SetTool(tool) => self.surface.set_tool(tool),
            ToolsAction::Undo => {
                self.surface.undo();
            }
            ToolsAction::Redo => {
                self.surface.redo();
            }
            ToolsAction::Clear => self.surface.clear(),
            ToolsAction::Resize(width, height) => {
                self.surface.reset(width, height);
                self.config.canvas.width = width;
                self.config.canvas.height = height;
                save_config(&self.config);
                tracing::info!(width, height, "Canvas resized");
            }
            ToolsAction::None => {}
        }
    }

    pub(super) fn handle_export_action(&mut self, action: ExportAction) {
        match action {
            ExportAction::ExportImage(format) => match self.export_drawing(format) {
                Ok(path) => {
                    self.notice = Some(Notice::Info(format!("Saved {}", path.display())));
                    self.last_export = Some(path);
                }
                Err(e) => {
                    tracing::error!("Image export failed: {:#}", e);
                    self.notice = Some(Notice::Error(format!("Export failed: {e}")));
                }
            },
            ExportAction::ChooseFolder => self.choose_export_dir(),
            ExportAction::OpenFolder => {
                if let Err(e) = open::that(&self.export_dir) {
                    tracing::warn!(dir = %self.export_dir.display(), "Failed to open export folder: {}", e);
                }
            }
            ExportAction::None => {}
        }
    }

    fn export_drawing(&mut self, format: ImageFormat) -> anyhow::Result<PathBuf> {
        // Never export a half-drawn stroke
        if self.surface.is_stroking() {
            self.surface.end_stroke();
        }
        let title = self.export_panel.title.clone();
        export_image(self.surface.buffer(), &self.export_dir, &title, format)
            .with_context(|| format!("exporting '{}' to {}", title, self.export_dir.display()))
    }

    pub(super) fn choose_export_dir(&mut self) {
        let Some(dir) = rfd::FileDialog::new()
            .set_title("Export folder")
            .set_directory(&self.export_dir)
            .pick_folder()
        else {
            return;
        };
        tracing::info!(dir = %dir.display(), "Export folder changed");
        self.config.export.directory = Some(dir.display().to_string());
        self.export_dir = dir;
        save_config(&self.config);
    }
}
