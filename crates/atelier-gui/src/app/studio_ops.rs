use std::path::PathBuf;
use std::sync::Arc;

use atelier_services::{export_audio, BeatLoop, CaptureConfig, CaptureSession, ExportError, VoiceMixer};

use super::types::{Notice, ToneOutput};
use super::AtelierApp;
use crate::panels::StudioAction;

impl AtelierApp {
    pub(super) fn handle_studio_action(&mut self, action: StudioAction) {
        match action {
            StudioAction::StartCapture => self.start_capture(),
            StudioAction::StopCapture => self.stop_capture(),
            StudioAction::PlayTake => {
                let Some(take) = self.studio.take() else { return };
                tracing::info!(duration = take.duration_secs, "Playing take");
                self.playback.play(&take.payload, &self.studio.settings);
            }
            StudioAction::StopPlayback => self.playback.stop_all(),
            StudioAction::SaveTake => self.save_take(),
            StudioAction::DownloadTake => {
                let Some(take) = self.studio.take() else { return };
                let result = export_audio(&take.payload, &self.export_dir, &self.studio.title);
                self.report_audio_export(result);
            }
            StudioAction::DiscardTake => {
                self.studio.discard_take();
            }
            StudioAction::ToggleBeat => self.toggle_beat(),
            StudioAction::PresetChanged => {
                tracing::info!(preset = self.studio.preset.label(), "Beat preset changed");
                if self.beat.is_some() {
                    self.beat = None;
                    self.start_beat();
                }
            }
            StudioAction::Select(id) => {
                if let Err(e) = self.studio.library.select(id) {
                    tracing::warn!("{}", e);
                }
            }
            StudioAction::PlaySelected => {
                let Some(recording) = self.studio.library.selected() else { return };
                tracing::info!(recording = %recording.name, "Playing recording");
                self.playback.play(&recording.payload, &self.studio.settings);
            }
            StudioAction::DownloadSelected => {
                let Some(recording) = self.studio.library.selected() else { return };
                let result = export_audio(&recording.payload, &self.export_dir, &recording.name);
                self.report_audio_export(result);
            }
            StudioAction::DownloadAll => self.download_all(),
            StudioAction::Delete(id) => match self.studio.library.remove(id) {
                Ok(removed) => tracing::info!(recording = %removed.name, "Recording deleted"),
                Err(e) => tracing::warn!("{}", e),
            },
            StudioAction::None => {}
        }
    }

    /// Surface playback requests that failed on the worker
    pub(super) fn report_playback_failures(&mut self) {
        for e in self.playback.take_failures() {
            tracing::error!("Playback failed: {}", e);
            self.notice = Some(Notice::Error(format!("Playback failed: {e}")));
        }
    }

    fn start_capture(&mut self) {
        if !self.studio.begin_capture() {
            return;
        }
        let settings = self.studio.settings;
        let config = CaptureConfig {
            device_id: self.config.studio.input_device.clone(),
            live_gain: settings.live_gain.then(|| settings.gain()),
        };

        match CaptureSession::start(&config) {
            Ok(session) => self.capture = Some(session),
            Err(e) => {
                tracing::error!("Failed to start capture: {}", e);
                self.studio.abort_capture();
                if e.is_access_problem() {
                    self.permission_error = Some(e.to_string());
                } else {
                    self.notice = Some(Notice::Error(format!("Recording failed: {e}")));
                }
            }
        }
    }

    fn stop_capture(&mut self) {
        let Some(session) = self.capture.take() else {
            self.studio.abort_capture();
            return;
        };
        let recorded = session.stop();
        match recorded.encode() {
            Ok(payload) => {
                tracing::info!(bytes = payload.len(), duration = recorded.duration_secs(), "Take ready");
                self.studio.finish_capture(payload, recorded.duration_secs());
            }
            Err(e) => {
                tracing::error!("Failed to encode take: {}", e);
                self.studio.abort_capture();
                self.notice = Some(Notice::Error(format!("Recording failed: {e}")));
            }
        }
    }

    /// Add the take to the library and write it to the export folder
    fn save_take(&mut self) {
        let Some(id) = self.studio.save_take() else { return };
        let Some(recording) = self.studio.library.get(id) else { return };
        tracing::info!(recording = %recording.name, "Take saved");
        let result = export_audio(&recording.payload, &self.export_dir, &recording.name);
        self.report_audio_export(result);
    }

    fn download_all(&mut self) {
        let results: Vec<_> = self
            .studio
            .library
            .iter()
            .map(|r| export_audio(&r.payload, &self.export_dir, &r.name))
            .collect();
        let total = results.len();
        let failed = results.iter().filter(|r| r.is_err()).count();
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            tracing::error!("Audio export failed: {}", err);
        }
        self.notice = Some(if failed == 0 {
            Notice::Info(format!("Saved {} recordings to {}", total, self.export_dir.display()))
        } else {
            Notice::Error(format!("{failed} of {total} recordings failed to save"))
        });
    }

    fn report_audio_export(&mut self, result: Result<PathBuf, ExportError>) {
        self.notice = Some(match result {
            Ok(path) => Notice::Info(format!("Saved {}", path.display())),
            Err(e) => {
                tracing::error!("Audio export failed: {}", e);
                Notice::Error(format!("Export failed: {e}"))
            }
        });
    }

    fn toggle_beat(&mut self) {
        if self.studio.toggle_beat() {
            self.start_beat();
        } else {
            // Dropping the loop joins its timer thread
            self.beat = None;
            tracing::info!("Beat stopped");
        }
    }

    fn start_beat(&mut self) {
        if self.tone_output.is_none() {
            match VoiceMixer::open_output() {
                Ok((mixer, stream)) => {
                    self.tone_output = Some(ToneOutput { mixer: Arc::new(mixer), _stream: stream });
                }
                Err(e) => {
                    tracing::error!("Failed to open beat output: {}", e);
                    self.studio.stop_beat();
                    self.notice = Some(Notice::Error(format!("Beat unavailable: {e}")));
                    return;
                }
            }
        }
        let Some(output) = &self.tone_output else { return };
        let pattern = self.studio.preset.pattern();
        self.beat = Some(BeatLoop::start(pattern, output.mixer.clone()));
    }
}
