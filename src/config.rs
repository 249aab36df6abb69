//! Configuration file handling for asciicam.
//!
//! Loads configuration from `~/.config/asciicam/config.toml` or a custom path.
//! Every value is optional; command-line flags override the file and the
//! file overrides built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ascii::RenderMode;
use crate::camera::{CameraSettings, Resolution};
use crate::terminal::{CellColor, ColorParseError, ColorProfile};

/// Configuration file structure for asciicam.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub greenscreen: GreenscreenConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// V4L2 device path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RenderSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ansi: Option<bool>,
    /// Single foreground color, `#rrggbb` or `#rgb`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<bool>,
    /// Force a color profile instead of detecting it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GreenscreenConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_index: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Read frames from `gst-launch-1.0` instead of a device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Pipeline description, must end in `fdsink fd=1` emitting RGB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Default sample directory, relative to the working directory.
pub const DEFAULT_SAMPLE_DIR: &str = "bgsample";

/// Starter file written by `config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r##"# asciicam configuration

[capture]
# V4L2 device
# device = "/dev/video0"
# Requested capture size (the driver may pick another)
# width = 320
# height = 180

[render]
# Half-block rendering with foreground and background colors
# ansi = false
# Draw every glyph in one color
# color = "#00ff00"
# Output size in cells (default: terminal size)
# width = 125
# height = 50
# Show the frame rate below the picture
# fps = false
# Force a color profile: truecolor, ansi256, ansi16, ascii
# profile = "truecolor"

[greenscreen]
# enabled = false
# sample_dir = "bgsample"
# threshold = 0.13
# sample_index = 40

[pipeline]
# enabled = false
# description = "videotestsrc ! video/x-raw,format=RGB,width=320,height=180 ! fdsink fd=1"
"##;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config = Self::parse(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Render as TOML, omitting unset values.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Write [`DEFAULT_CONFIG_TEMPLATE`] to `path`, refusing to overwrite.
pub fn init_file(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Errors that can occur when loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),

    #[error("Unknown color profile '{0}' (expected truecolor, ansi256, ansi16 or ascii)")]
    InvalidProfile(String),

    #[error("Threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("Capture size must be non-zero, got {0}")]
    InvalidResolution(Resolution),

    #[error("--gst-pipeline is required when --gst is set")]
    MissingPipeline,
}

/// Where frames come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSettings {
    Device(CameraSettings),
    Pipeline {
        description: String,
        resolution: Resolution,
    },
}

impl SourceSettings {
    pub fn resolution(&self) -> Resolution {
        match self {
            SourceSettings::Device(camera) => camera.resolution,
            SourceSettings::Pipeline { resolution, .. } => *resolution,
        }
    }
}

/// What a run does with its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Render,
    /// Write background samples and exit
    RecordSamples,
}

/// Fully resolved runtime settings, built from flags, file and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: SourceSettings,
    pub run_mode: RunMode,
    pub sample_dir: PathBuf,
    pub greenscreen: bool,
    pub threshold: f64,
    pub sample_index: u32,
    pub render_mode: RenderMode,
    pub override_color: Option<CellColor>,
    /// Output size; `None` means the terminal's
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub show_fps: bool,
    /// Forced color profile; `None` means detect
    pub profile: Option<ColorProfile>,
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("asciicam").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/asciicam/config.toml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_all_sections() {
        let config = Config::parse(
            r##"
[capture]
device = "/dev/video2"
width = 640
height = 480

[render]
ansi = true
color = "#0f0"
fps = true
profile = "ansi256"

[greenscreen]
enabled = true
sample_dir = "/tmp/bg"
threshold = 0.2
sample_index = 7

[pipeline]
enabled = true
description = "videotestsrc ! fdsink fd=1"
"##,
        )
        .unwrap();

        assert_eq!(config.capture.device.as_deref(), Some("/dev/video2"));
        assert_eq!(config.capture.width, Some(640));
        assert_eq!(config.render.ansi, Some(true));
        assert_eq!(config.render.color.as_deref(), Some("#0f0"));
        assert_eq!(config.render.profile.as_deref(), Some("ansi256"));
        assert_eq!(config.greenscreen.sample_dir, Some(PathBuf::from("/tmp/bg")));
        assert_eq!(config.greenscreen.threshold, Some(0.2));
        assert_eq!(config.greenscreen.sample_index, Some(7));
        assert_eq!(config.pipeline.enabled, Some(true));
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse("[render]\nfps = true\n").unwrap();
        assert_eq!(config.render.fps, Some(true));
        assert_eq!(config.capture, CaptureConfig::default());
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[render\nansi = ").unwrap();
        match Config::load(Some(&path)) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::parse(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_init_writes_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("asciicam/config.toml");
        init_file(&path).unwrap();
        assert!(path.exists());
        assert!(matches!(init_file(&path), Err(ConfigError::AlreadyExists(_))));
    }

    #[test]
    fn test_to_toml_skips_unset() {
        let mut config = Config::default();
        config.render.fps = Some(true);
        let text = config.to_toml().unwrap();
        assert!(text.contains("fps = true"));
        assert!(!text.contains("device"));
        assert_eq!(Config::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        assert!(default_path().ends_with("asciicam/config.toml"));
    }
}
