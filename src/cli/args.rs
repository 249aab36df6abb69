//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::ascii::RenderMode;
use crate::camera::{CameraSettings, Resolution};
use crate::config::{Config, ConfigError, RunMode, Settings, SourceSettings, DEFAULT_SAMPLE_DIR};
use crate::greenscreen::{DEFAULT_SAMPLE_INDEX, DEFAULT_THRESHOLD};
use crate::terminal::{parse_hex_color, ColorProfile};

/// Render a webcam or GStreamer stream as colored text in the terminal
#[derive(Parser, Debug)]
#[command(name = "asciicam")]
#[command(version, about = "Webcam to colored ASCII art in the terminal", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Video device [default: /dev/video0]
    #[arg(long, visible_alias = "dev")]
    pub device: Option<String>,

    /// Where to find/store the background samples [default: bgsample]
    #[arg(long)]
    pub sample: Option<PathBuf>,

    /// Record background samples and exit
    #[arg(long = "gen")]
    pub generate: bool,

    /// Mask out the recorded background
    #[arg(long)]
    pub greenscreen: bool,

    /// Greenscreen Lab distance threshold [default: 0.13]
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Background sample used for the greenscreen [default: 40]
    #[arg(long)]
    pub sample_index: Option<u32>,

    /// Render with colored half blocks instead of glyphs
    #[arg(long)]
    pub ansi: bool,

    /// Draw every glyph in one color (#rrggbb or #rgb)
    #[arg(long)]
    pub color: Option<String>,

    /// Output width in columns (0 or unset: terminal width)
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height in rows (0 or unset: terminal height)
    #[arg(long)]
    pub height: Option<u32>,

    /// Capture width [default: 320]
    #[arg(long, visible_alias = "camWidth")]
    pub cam_width: Option<u32>,

    /// Capture height [default: 180]
    #[arg(long, visible_alias = "camHeight")]
    pub cam_height: Option<u32>,

    /// Show frames per second
    #[arg(long)]
    pub fps: bool,

    /// Read frames from a GStreamer pipeline instead of a device
    #[arg(long)]
    pub gst: bool,

    /// GStreamer pipeline emitting raw RGB frames to fdsink fd=1
    #[arg(long)]
    pub gst_pipeline: Option<String>,

    /// Color profile: truecolor, ansi256, ansi16, ascii [default: detect]
    #[arg(long)]
    pub profile: Option<String>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the pixel formats a capture device offers
    ListFormats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// `0` means "not given", matching the terminal-size fallback.
fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|&v| v > 0)
}

impl Args {
    /// Device path after applying the config file and defaults.
    pub fn device_path(&self, config: &Config) -> String {
        self.device
            .clone()
            .or_else(|| config.capture.device.clone())
            .unwrap_or_else(|| CameraSettings::default().device)
    }

    /// Merge flags over `config` over built-in defaults.
    pub fn resolve(&self, config: &Config) -> Result<Settings, ConfigError> {
        let defaults = Resolution::DEFAULT_CAPTURE;
        let resolution = Resolution::new(
            self.cam_width.or(config.capture.width).unwrap_or(defaults.width),
            self.cam_height.or(config.capture.height).unwrap_or(defaults.height),
        );
        if resolution.width == 0 || resolution.height == 0 {
            return Err(ConfigError::InvalidResolution(resolution));
        }

        let source = if self.gst || config.pipeline.enabled.unwrap_or(false) {
            let description = self
                .gst_pipeline
                .clone()
                .or_else(|| config.pipeline.description.clone())
                .filter(|d| !d.trim().is_empty())
                .ok_or(ConfigError::MissingPipeline)?;
            SourceSettings::Pipeline {
                description,
                resolution,
            }
        } else {
            SourceSettings::Device(CameraSettings {
                device: self.device_path(config),
                resolution,
            })
        };

        let threshold = self
            .threshold
            .or(config.greenscreen.threshold)
            .unwrap_or(DEFAULT_THRESHOLD);
        if threshold.is_nan() || threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        let override_color = self
            .color
            .as_deref()
            .or(config.render.color.as_deref())
            .filter(|c| !c.is_empty())
            .map(parse_hex_color)
            .transpose()?;

        let profile = self
            .profile
            .as_deref()
            .or(config.render.profile.as_deref())
            .map(|name| {
                ColorProfile::from_name(name).ok_or_else(|| ConfigError::InvalidProfile(name.to_string()))
            })
            .transpose()?;

        let ansi = self.ansi || config.render.ansi.unwrap_or(false);

        Ok(Settings {
            source,
            run_mode: if self.generate {
                RunMode::RecordSamples
            } else {
                RunMode::Render
            },
            sample_dir: self
                .sample
                .clone()
                .or_else(|| config.greenscreen.sample_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLE_DIR)),
            greenscreen: self.greenscreen || config.greenscreen.enabled.unwrap_or(false),
            threshold,
            sample_index: self
                .sample_index
                .or(config.greenscreen.sample_index)
                .unwrap_or(DEFAULT_SAMPLE_INDEX),
            render_mode: if ansi {
                RenderMode::HalfBlock
            } else {
                RenderMode::Ascii
            },
            override_color,
            width: non_zero(self.width).or(non_zero(config.render.width)),
            height: non_zero(self.height).or(non_zero(config.render.height)),
            show_fps: self.fps || config.render.fps.unwrap_or(false),
            profile,
        })
    }
}
