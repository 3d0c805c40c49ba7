use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::context::Theme;
use crate::error::StudioResult;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `JOURNEY_STUDIO__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Canvas geometry shared by the graph model and the interaction engine.
#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_width")]
    pub width: f64,
    #[serde(default = "default_canvas_height")]
    pub height: f64,
    #[serde(default = "default_node_width")]
    pub node_width: f64,
    #[serde(default = "default_node_height")]
    pub node_height: f64,
    #[serde(default = "default_x")]
    pub default_x: f64,
    #[serde(default = "default_y")]
    pub default_y: f64,
    #[serde(default = "default_duplicate_offset")]
    pub duplicate_offset: f64,
    #[serde(default = "default_drop_anchor_x")]
    pub drop_anchor_x: f64,
    #[serde(default = "default_drop_anchor_y")]
    pub drop_anchor_y: f64,
    #[serde(default = "default_action_button_size")]
    pub action_button_size: f64,
    #[serde(default = "default_action_button_margin")]
    pub action_button_margin: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    #[serde(default = "default_name_prefix_chars")]
    pub name_prefix_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub sidebar_collapsed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub json: bool,
}

// Default functions
fn default_canvas_width() -> f64 {
    800.0
}
fn default_canvas_height() -> f64 {
    600.0
}
fn default_node_width() -> f64 {
    250.0
}
fn default_node_height() -> f64 {
    150.0
}
fn default_x() -> f64 {
    200.0
}
fn default_y() -> f64 {
    200.0
}
fn default_duplicate_offset() -> f64 {
    20.0
}
fn default_drop_anchor_x() -> f64 {
    100.0
}
fn default_drop_anchor_y() -> f64 {
    50.0
}
fn default_action_button_size() -> f64 {
    24.0
}
fn default_action_button_margin() -> f64 {
    8.0
}
fn default_latency_ms() -> u64 {
    2000
}
fn default_name_prefix_chars() -> usize {
    30
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./journeys")
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            node_width: default_node_width(),
            node_height: default_node_height(),
            default_x: default_x(),
            default_y: default_y(),
            duplicate_offset: default_duplicate_offset(),
            drop_anchor_x: default_drop_anchor_x(),
            drop_anchor_y: default_drop_anchor_y(),
            action_button_size: default_action_button_size(),
            action_button_margin: default_action_button_margin(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            name_prefix_chars: default_name_prefix_chars(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            generator: GeneratorConfig::default(),
            storage: StorageConfig::default(),
            ui: UiConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config
    /// file. An explicitly given file must exist.
    pub fn load(file: Option<&Path>) -> StudioResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            debug!(path = %path.display(), "Adding config file source");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("JOURNEY_STUDIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_editor_geometry() {
        let config = AppConfig::default();
        assert_eq!(config.canvas.width, 800.0);
        assert_eq!(config.canvas.height, 600.0);
        assert_eq!(config.canvas.node_width, 250.0);
        assert_eq!(config.canvas.node_height, 150.0);
        assert_eq!(config.generator.latency_ms, 2000);
        assert_eq!(config.ui.theme, Theme::Light);
    }

    #[test]
    fn test_load_from_toml_file_keeps_unset_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[canvas]\nwidth = 1024.0\n\n[generator]\nlatency_ms = 0\n\n[ui]\ntheme = \"dark\""
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.canvas.width, 1024.0);
        assert_eq!(config.canvas.height, 600.0);
        assert_eq!(config.generator.latency_ms, 0);
        assert_eq!(config.ui.theme, Theme::Dark);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = AppConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, crate::error::StudioError::Config(_)));
    }
}
