//! Audio studio: capture, take handling, beat loop, playback settings and library

use atelier_core::{BeatPreset, RecordingId, StudioState, PATTERN_STEPS};
use atelier_services::MeterState;
use egui::{Color32, Rect, RichText, ScrollArea, Sense, Slider, Stroke, Ui, Vec2};

/// Actions that can be triggered from the studio panel
pub enum StudioAction {
    None,
    StartCapture,
    StopCapture,
    PlayTake,
    SaveTake,
    DownloadTake,
    DiscardTake,
    StopPlayback,
    ToggleBeat,
    PresetChanged,
    Select(RecordingId),
    PlaySelected,
    DownloadSelected,
    DownloadAll,
    Delete(RecordingId),
}

/// Live device status shown alongside the studio state
pub struct StudioStatus<'a> {
    pub meter: Option<&'a MeterState>,
    pub capture_secs: Option<f64>,
    pub is_playing: bool,
    pub beat_step: Option<usize>,
}

pub struct StudioPanel {
    display_peak: f32,
}

impl StudioPanel {
    pub fn new() -> Self {
        Self { display_peak: 0.0 }
    }

    pub fn ui(&mut self, ui: &mut Ui, studio: &mut StudioState, status: &StudioStatus<'_>) -> StudioAction {
        let mut action = StudioAction::None;

        ui.heading("Studio");
        ui.horizontal(|ui| {
            ui.label("Title");
            ui.text_edit_singleline(&mut studio.title);
        });

        ui.separator();
        self.capture_row(ui, studio, status, &mut action);
        take_row(ui, studio, status, &mut action);

        ui.separator();
        beat_row(ui, studio, status, &mut action);

        ui.separator();
        settings_rows(ui, studio);

        ui.separator();
        library_list(ui, studio, &mut action);

        action
    }

    fn capture_row(&mut self, ui: &mut Ui, studio: &StudioState, status: &StudioStatus<'_>, action: &mut StudioAction) {
        ui.horizontal(|ui| {
            let capturing = studio.is_capturing();
            let rec_color = if capturing {
                Color32::from_rgb(255, 50, 50)
            } else {
                Color32::from_rgb(200, 80, 80)
            };
            let label = if capturing { "\u{23F9} Stop" } else { "\u{23FA} Record" };
            let rec_btn = ui.button(RichText::new(label).size(16.0).color(rec_color));
            if rec_btn.clicked() {
                *action = if capturing { StudioAction::StopCapture } else { StudioAction::StartCapture };
            }

            if let Some(secs) = status.capture_secs {
                ui.label(RichText::new("REC").color(Color32::RED).strong());
                ui.monospace(format!("{:02}:{:04.1}", (secs / 60.0) as u32, secs % 60.0));
            }

            self.draw_meter(ui, status.meter);
        });
    }

    fn draw_meter(&mut self, ui: &mut Ui, meter: Option<&MeterState>) {
        let peak = meter.map(MeterState::peak).unwrap_or(0.0);
        self.display_peak = self.display_peak * 0.7 + peak * 0.3;

        let meter_size = Vec2::new(150.0, 12.0);
        let (response, painter) = ui.allocate_painter(meter_size + Vec2::new(8.0, 2.0), Sense::click());
        let meter_rect = Rect::from_min_size(response.rect.min + Vec2::splat(1.0), meter_size);
        painter.rect_filled(meter_rect, 2.0, Color32::from_gray(25));

        let fill = db_to_fraction(linear_to_db(self.display_peak)) * meter_rect.width();
        if fill > 0.0 {
            let color = if self.display_peak > 0.5 {
                Color32::from_rgb(180, 50, 50)
            } else if self.display_peak > 0.25 {
                Color32::from_rgb(180, 160, 50)
            } else {
                Color32::from_rgb(50, 160, 50)
            };
            painter.rect_filled(Rect::from_min_size(meter_rect.min, Vec2::new(fill, meter_size.y)), 2.0, color);
        }
        painter.rect_stroke(meter_rect, 2.0, Stroke::new(1.0, Color32::from_gray(50)), egui::StrokeKind::Outside);

        if let Some(meter) = meter.filter(|m| m.is_clipped()) {
            painter.rect_filled(
                Rect::from_min_size(egui::pos2(meter_rect.right() + 2.0, meter_rect.top()), Vec2::new(5.0, meter_size.y)),
                2.0,
                Color32::RED,
            );
            if response.clicked() {
                meter.clear_clip();
            }
        }
    }
}

fn take_row(ui: &mut Ui, studio: &StudioState, status: &StudioStatus<'_>, action: &mut StudioAction) {
    let take = studio.take();
    ui.horizontal(|ui| {
        match take {
            Some(take) => ui.label(format!("Take: {:.1}s", take.duration_secs)),
            None => ui.label(RichText::new("No take yet").weak()),
        };
        match transport_action(take.is_some(), status.is_playing) {
            Some(StudioAction::StopPlayback) => {
                if ui.button("\u{23F9} Stop").clicked() {
                    *action = StudioAction::StopPlayback;
                }
            }
            Some(play) => {
                if ui.button("\u{25B6} Play").clicked() {
                    *action = play;
                }
            }
            None => {}
        }
        if take.is_none() {
            return;
        }
        if ui.button("Save").clicked() {
            *action = StudioAction::SaveTake;
        }
        if ui.button("Download").clicked() {
            *action = StudioAction::DownloadTake;
        }
        if ui.small_button("\u{2715}").on_hover_text("Discard take").clicked() {
            *action = StudioAction::DiscardTake;
        }
    });
}

/// Stop while anything is playing, whether it came from the take or the library
fn transport_action(has_take: bool, is_playing: bool) -> Option<StudioAction> {
    if is_playing {
        Some(StudioAction::StopPlayback)
    } else if has_take {
        Some(StudioAction::PlayTake)
    } else {
        None
    }
}

fn beat_row(ui: &mut Ui, studio: &mut StudioState, status: &StudioStatus<'_>, action: &mut StudioAction) {
    ui.horizontal(|ui| {
        ui.label("Beat");
        let before = studio.preset;
        egui::ComboBox::from_id_salt("beat_preset")
            .selected_text(studio.preset.label())
            .show_ui(ui, |ui| {
                for preset in BeatPreset::ALL {
                    ui.selectable_value(&mut studio.preset, preset, preset.label());
                }
            });
        if studio.preset != before {
            *action = StudioAction::PresetChanged;
        }

        let pattern = studio.preset.pattern();
        ui.label(RichText::new(format!("{} BPM", pattern.bpm)).weak());

        let beat_label = if studio.is_beat_playing() { "\u{23F9} Stop beat" } else { "\u{25B6} Play beat" };
        if ui.button(beat_label).clicked() {
            *action = StudioAction::ToggleBeat;
        }

        // Step lights
        let (rect, _) = ui.allocate_exact_size(Vec2::new(PATTERN_STEPS as f32 * 12.0, 10.0), Sense::hover());
        for (i, &on) in pattern.onsets.iter().enumerate() {
            let cell = Rect::from_min_size(rect.min + Vec2::new(i as f32 * 12.0, 0.0), Vec2::splat(10.0));
            let lit = status.beat_step == Some(i);
            let color = match (on, lit) {
                (true, true) => Color32::from_rgb(255, 180, 60),
                (true, false) => Color32::from_rgb(120, 90, 40),
                (false, true) => Color32::from_gray(140),
                (false, false) => Color32::from_gray(50),
            };
            ui.painter().rect_filled(cell, 2.0, color);
        }
    });
}

fn settings_rows(ui: &mut Ui, studio: &mut StudioState) {
    let settings = &mut studio.settings;
    ui.add(Slider::new(&mut settings.volume, 0..=100).suffix("%").text("Volume"));
    ui.horizontal(|ui| {
        ui.checkbox(&mut settings.enhance, "Enhance");
        ui.add_enabled(
            settings.enhance,
            Slider::new(&mut settings.tune_amount, 0..=100).text("Tune"),
        );
    });
    ui.checkbox(&mut settings.live_gain, "Apply volume while recording");
}

fn library_list(ui: &mut Ui, studio: &StudioState, action: &mut StudioAction) {
    let library = &studio.library;
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("Recordings ({})", library.len())).strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.add_enabled(!library.is_empty(), egui::Button::new("Download all")).clicked() {
                *action = StudioAction::DownloadAll;
            }
        });
    });

    if library.is_empty() {
        ui.label(RichText::new("Saved recordings appear here").weak());
        return;
    }

    ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
        let selected = library.selected_id();
        for recording in library.iter() {
            ui.horizontal(|ui| {
                let is_selected = selected == Some(recording.id);
                if ui.selectable_label(is_selected, &recording.name).clicked() {
                    *action = StudioAction::Select(recording.id);
                }
                ui.label(
                    RichText::new(format!("{:.1}s · {} KB", recording.duration_secs, recording.size_bytes() / 1024))
                        .small()
                        .weak(),
                );
                if ui.small_button("\u{1F5D1}").on_hover_text("Delete").clicked() {
                    *action = StudioAction::Delete(recording.id);
                }
            });
        }
    });

    ui.horizontal(|ui| {
        let has_selection = library.selected().is_some();
        if ui.add_enabled(has_selection, egui::Button::new("\u{25B6} Play selected")).clicked() {
            *action = StudioAction::PlaySelected;
        }
        if ui.add_enabled(has_selection, egui::Button::new("Download selected")).clicked() {
            *action = StudioAction::DownloadSelected;
        }
    });
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        return -60.0;
    }
    (20.0 * linear.log10()).max(-60.0)
}

/// Map -60..0 dB onto 0..1
fn db_to_fraction(db: f32) -> f32 {
    ((db + 60.0) / 60.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_offered_for_library_playback_without_take() {
        assert!(matches!(transport_action(false, true), Some(StudioAction::StopPlayback)));
        assert!(matches!(transport_action(true, true), Some(StudioAction::StopPlayback)));
        assert!(matches!(transport_action(true, false), Some(StudioAction::PlayTake)));
        assert!(transport_action(false, false).is_none());
    }

    #[test]
    fn test_meter_scale() {
        assert_eq!(db_to_fraction(linear_to_db(1.0)), 1.0);
        assert_eq!(db_to_fraction(linear_to_db(0.0)), 0.0);
        assert!((db_to_fraction(linear_to_db(0.1)) - 2.0 / 3.0).abs() < 1e-5);
    }
}
