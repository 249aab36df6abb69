//! Terminal management: alternate screen, color profiles and frame output.

mod color;
mod output;
mod screen;
mod size;

pub use color::{parse_hex_color, to_ansi16, to_ansi256, CellColor, ColorParseError, ColorProfile};
pub use output::TerminalOutput;
pub use screen::ScreenGuard;
pub use size::{resolve_output_size, terminal_size, FALLBACK_SIZE};
