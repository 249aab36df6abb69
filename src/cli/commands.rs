//! Subcommand handlers for list-formats and config actions.

use std::fmt::Write;
use std::path::Path;

use super::args::ConfigAction;
use crate::camera::{self, FormatInfo, SourceError};
use crate::config::{self, Config, ConfigError};

/// Print the pixel formats of `device`, marking the one capture would use.
pub fn list_formats(device: &str) -> Result<(), SourceError> {
    let formats = camera::list_formats(device)?;
    print!("{}", format_listing(device, &formats));
    Ok(())
}

fn format_listing(device: &str, formats: &[FormatInfo]) -> String {
    let mut out = String::new();
    if formats.is_empty() {
        let _ = writeln!(out, "No formats reported by {}.", device);
        return out;
    }

    let selected = camera::select_yuyv(formats).map(|f| f.index);
    let _ = writeln!(out, "Formats offered by {}:", device);
    for format in formats {
        let marker = if Some(format.index) == selected { "*" } else { " " };
        let _ = writeln!(out, "{} {}", marker, format);
    }
    if selected.is_none() {
        let _ = writeln!(out);
        let _ = writeln!(out, "No YUYV format: use --gst with a GStreamer pipeline instead.");
    }
    out
}

/// Handle config subcommand actions against `path` (or the default path).
pub fn handle_config_action(action: ConfigAction, path: Option<&Path>) -> Result<(), ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_path);

    match action {
        ConfigAction::Show => {
            let exists = config_path.exists();
            println!(
                "Config file: {} ({})",
                config_path.display(),
                if exists { "exists" } else { "not found" }
            );

            let cfg = Config::load(Some(&config_path))?;
            if cfg == Config::default() {
                println!("No values set; built-in defaults apply.");
            } else {
                println!();
                print!("{}", cfg.to_toml()?);
            }
        }
        ConfigAction::Init => {
            config::init_file(&config_path)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}
