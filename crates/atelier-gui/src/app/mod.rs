//! Main application state

mod canvas_ops;
mod config;
mod studio_ops;
mod types;

use std::path::PathBuf;
use std::time::Duration;

use atelier_core::{DrawingSurface, StudioState};
use atelier_services::{BeatLoop, CaptureSession, PlaybackService};
use eframe::CreationContext;
use egui::{Color32, Context, Key, KeyboardShortcut, Modifiers, RichText};

use config::{load_config, AppConfig};
use types::{Notice, ToneOutput};

use crate::panels::{CanvasPanel, ExportPanel, StudioPanel, StudioStatus, ToolsPanel};

const PERMISSION_MESSAGE: &str = "Please allow microphone access to record audio.";

pub struct AtelierApp {
    config: AppConfig,

    // Drawing widget
    surface: DrawingSurface,
    export_dir: PathBuf,
    last_export: Option<PathBuf>,

    // Studio widget
    studio: StudioState,
    capture: Option<CaptureSession>,
    playback: PlaybackService,
    beat: Option<BeatLoop>,
    tone_output: Option<ToneOutput>,
    saved_volume: u8,

    // Panels
    canvas_panel: CanvasPanel,
    tools_panel: ToolsPanel,
    export_panel: ExportPanel,
    studio_panel: StudioPanel,

    // Blocking message (microphone access)
    permission_error: Option<String>,
    notice: Option<Notice>,
}

impl AtelierApp {
    pub fn new(_cc: &CreationContext<'_>) -> Self {
        let config = load_config();

        let surface = DrawingSurface::new(
            config.canvas.width,
            config.canvas.height,
            config.canvas.history_capacity,
        );

        let mut studio = StudioState::new();
        studio.settings.volume = config.studio.volume;

        tracing::info!(
            width = surface.width(),
            height = surface.height(),
            history = config.canvas.history_capacity,
            "Drawing surface ready"
        );

        Self {
            export_dir: config.export.resolve_directory(),
            saved_volume: studio.settings.volume,
            config,
            surface,
            last_export: None,
            studio,
            capture: None,
            playback: PlaybackService::new(),
            beat: None,
            tone_output: None,
            canvas_panel: CanvasPanel::new(),
            tools_panel: ToolsPanel::new(),
            export_panel: ExportPanel::new(),
            studio_panel: StudioPanel::new(),
            permission_error: None,
            notice: None,
        }
    }

    fn handle_shortcuts(&mut self, ctx: &Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let redo_shift = KeyboardShortcut::new(Modifiers::COMMAND | Modifiers::SHIFT, Key::Z);
        let redo = KeyboardShortcut::new(Modifiers::COMMAND, Key::Y);
        let undo = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);

        if ctx.input_mut(|i| i.consume_shortcut(&redo_shift) || i.consume_shortcut(&redo)) {
            self.surface.redo();
        } else if ctx.input_mut(|i| i.consume_shortcut(&undo)) {
            self.surface.undo();
        }
    }

    fn permission_modal(&mut self, ctx: &Context) {
        let Some(message) = &self.permission_error else { return };
        let mut dismissed = false;
        let modal = egui::Modal::new(egui::Id::new("microphone_access")).show(ctx, |ui| {
            ui.set_width(320.0);
            ui.heading("Microphone unavailable");
            ui.add_space(6.0);
            ui.label(PERMISSION_MESSAGE);
            ui.label(RichText::new(message).small().weak());
            ui.add_space(6.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
        if dismissed || modal.should_close() {
            self.permission_error = None;
        }
    }

    /// Persist the volume once the slider is released
    fn sync_volume_config(&mut self, ctx: &Context) {
        let volume = self.studio.settings.volume;
        if volume == self.saved_volume || ctx.input(|i| i.pointer.any_down()) {
            return;
        }
        self.saved_volume = volume;
        self.config.studio.volume = volume;
        config::save_config(&self.config);
    }

    fn is_animating(&self) -> bool {
        self.capture.is_some() || self.beat.is_some() || self.playback.is_playing()
    }
}

impl eframe::App for AtelierApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.report_playback_failures();

        // 1. Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let history = self.surface.history();
                ui.label(RichText::new(format!(
                    "History {}/{}",
                    history.cursor().map_or(0, |c| c + 1),
                    history.len()
                )).small());
                ui.separator();
                ui.label(RichText::new(format!("{} × {}", self.surface.width(), self.surface.height())).small());
                if let Some(notice) = &self.notice {
                    ui.separator();
                    let color = if notice.is_error() { Color32::from_rgb(220, 90, 90) } else { Color32::GRAY };
                    ui.label(RichText::new(notice.text()).small().color(color));
                }
            });
        });

        // 2. Left: drawing tools + export
        let (tools_action, export_action) = egui::SidePanel::left("tools_panel")
            .resizable(false)
            .exact_width(230.0)
            .show(ctx, |ui| {
                let history = self.surface.history();
                let tools_action = self.tools_panel.ui(
                    ui,
                    self.surface.tool(),
                    history.can_undo(),
                    history.can_redo(),
                    (self.surface.width(), self.surface.height()),
                );
                ui.separator();
                let export_action = self.export_panel.ui(ui, &self.export_dir, self.last_export.as_deref());
                (tools_action, export_action)
            })
            .inner;
        self.handle_tools_action(tools_action);
        self.handle_export_action(export_action);

        // 3. Right: audio studio
        let studio_action = egui::SidePanel::right("studio_panel")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                let meter = self.capture.as_ref().map(CaptureSession::meter);
                let status = StudioStatus {
                    meter: meter.as_deref(),
                    capture_secs: self.capture.as_ref().map(CaptureSession::elapsed_secs),
                    is_playing: self.playback.is_playing(),
                    beat_step: self.beat.as_ref().map(BeatLoop::current_step),
                };
                self.studio_panel.ui(ui, &mut self.studio, &status)
            })
            .inner;
        self.handle_studio_action(studio_action);

        // 4. Center: canvas
        let canvas_action = egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(Color32::from_gray(60)))
            .show(ctx, |ui| {
                ui.centered_and_justified(|ui| self.canvas_panel.ui(ui, &self.surface)).inner
            })
            .inner;
        self.handle_canvas_action(canvas_action);

        self.permission_modal(ctx);
        self.sync_volume_config(ctx);

        if self.is_animating() {
            ctx.request_repaint_after(Duration::from_millis(33));
        }
    }
}
