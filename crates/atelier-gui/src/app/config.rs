use std::path::PathBuf;

use atelier_core::{CANVAS_DEFAULT, DEFAULT_HISTORY_CAPACITY};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Default)]
pub(super) struct AppConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub studio: StudioConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub(super) struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub history_capacity: usize,
}

impl CanvasConfig {
    /// Largest accepted canvas side; bigger sizes fall back to the default
    pub const MAX_SIDE: u32 = 4096;

    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let valid = |side: u32| (1..=Self::MAX_SIDE).contains(&side);
        if valid(self.width) && valid(self.height) {
            return self;
        }
        tracing::warn!(width = self.width, height = self.height, "Canvas size out of range, using default");
        Self { width: defaults.width, height: defaults.height, ..self }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_DEFAULT.0,
            height: CANVAS_DEFAULT.1,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub(super) struct StudioConfig {
    /// Input device name, or "default"
    pub input_device: String,
    pub volume: u8,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            input_device: "default".to_string(),
            volume: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Default)]
pub(super) struct ExportConfig {
    #[serde(default)]
    pub directory: Option<String>,
}

impl ExportConfig {
    /// Configured directory, else `<documents>/Atelier`
    pub fn resolve_directory(&self) -> PathBuf {
        self.directory
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::document_dir()
                    .or_else(dirs::home_dir)
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("Atelier")
            })
    }
}

pub(super) fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("atelier")
        .join("config.toml")
}

pub(super) fn load_config() -> AppConfig {
    let path = config_path();
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| parse_config(&s))
        .unwrap_or_default()
}

fn parse_config(s: &str) -> Option<AppConfig> {
    match toml::from_str::<AppConfig>(s) {
        Ok(mut config) => {
            config.canvas = config.canvas.sanitized();
            config.studio.volume = config.studio.volume.min(100);
            Some(config)
        }
        Err(e) => {
            tracing::warn!("Ignoring invalid config file: {}", e);
            None
        }
    }
}

pub(super) fn save_config(config: &AppConfig) {
    let path = config_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(s) = toml::to_string_pretty(config) else { return };
    if let Err(e) = std::fs::write(&path, s) {
        tracing::warn!(path = %path.display(), "Failed to save config: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config("[canvas]\nwidth = 400\n").unwrap();
        assert_eq!(config.canvas.width, 400);
        assert_eq!(config.canvas.height, 600);
        assert_eq!(config.canvas.history_capacity, 32);
        assert_eq!(config.studio, StudioConfig::default());
        assert_eq!(config.export.directory, None);
    }

    #[test]
    fn test_oversized_canvas_falls_back_to_default() {
        let config = parse_config("[canvas]\nwidth = 100000\nheight = 100000\nhistory_capacity = 8\n").unwrap();
        assert_eq!((config.canvas.width, config.canvas.height), CANVAS_DEFAULT);
        assert_eq!(config.canvas.history_capacity, 8);

        let config = parse_config("[canvas]\nwidth = 0\nheight = 300\n").unwrap();
        assert_eq!((config.canvas.width, config.canvas.height), CANVAS_DEFAULT);

        let config = parse_config("[canvas]\nwidth = 4096\nheight = 300\n").unwrap();
        assert_eq!((config.canvas.width, config.canvas.height), (4096, 300));
    }

    #[test]
    fn test_volume_is_capped() {
        let config = parse_config("[studio]\nvolume = 250\n").unwrap();
        assert_eq!(config.studio.volume, 100);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(parse_config("canvas = [").is_none());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut config = AppConfig::default();
        config.export.directory = Some("/tmp/art".to_string());
        config.studio.volume = 40;
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(parse_config(&text), Some(config));
    }

    #[test]
    fn test_export_directory_override() {
        let config = ExportConfig { directory: Some("/tmp/art".to_string()) };
        assert_eq!(config.resolve_directory(), PathBuf::from("/tmp/art"));
    }
}
