//! Text rendering of RGBA frames.
//!
//! Two output geometries are supported:
//!
//! - **Character mode** maps each pixel's alpha-weighted brightness onto
//!   [`GLYPH_RAMP`] and colors the glyph with the pixel (or a fixed
//!   override color).
//! - **Half-block mode** draws `▀` with the upper pixel as foreground and
//!   the lower pixel as background, doubling vertical resolution.
//!
//! Colors are downsampled to the terminal's [`ColorProfile`](crate::terminal::ColorProfile).

mod charset;
mod mapping;
mod render;

pub use charset::{FULL_SPAN, GLYPH_RAMP, UPPER_HALF_BLOCK};
pub use mapping::{bucket_width, glyph_index, intensity, pixel_to_glyph};
pub use render::{render, render_ascii, render_half_blocks, RenderConfig, RenderMode};
