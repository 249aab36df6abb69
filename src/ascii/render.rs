//! Frame to terminal text.

use image::{GenericImageView, Rgba};

use super::charset::UPPER_HALF_BLOCK;
use super::mapping::pixel_to_glyph;
use crate::terminal::{CellColor, ColorProfile};

/// Output geometry of the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// One glyph per pixel, chosen by intensity
    #[default]
    Ascii,
    /// One `▀` per two vertically stacked pixels
    HalfBlock,
}

impl RenderMode {
    /// Image rows consumed per terminal row.
    pub fn rows_per_line(&self) -> u32 {
        match self {
            RenderMode::Ascii => 1,
            RenderMode::HalfBlock => 2,
        }
    }
}

/// Everything the renderer needs besides the image. Built once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Fixed foreground for character mode; ignored in half-block mode
    pub override_color: Option<CellColor>,
    /// Output width in terminal columns
    pub width: u32,
    /// Output height in terminal rows
    pub height: u32,
    pub mode: RenderMode,
    pub profile: ColorProfile,
}

impl RenderConfig {
    /// Dimensions an image must have before it is rendered.
    ///
    /// Half-block mode packs two image rows into each terminal row, so the
    /// image is twice as tall as the output.
    pub fn image_size(&self) -> (u32, u32) {
        (self.width, self.height * self.mode.rows_per_line())
    }
}

/// Render an image in the mode selected by `config`.
pub fn render<I>(image: &I, config: &RenderConfig) -> String
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    match config.mode {
        RenderMode::Ascii => render_ascii(image, config.profile, config.override_color),
        RenderMode::HalfBlock => render_half_blocks(image, config.profile),
    }
}

/// Character mode: one glyph per pixel, one line per image row.
///
/// Each glyph is colored with `override_color` when given, otherwise with
/// the pixel's own RGB. Masked pixels go through the same path and come
/// out as blank cells.
pub fn render_ascii<I>(image: &I, profile: ColorProfile, override_color: Option<CellColor>) -> String
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let mut out = String::with_capacity(estimate_capacity(width, height, profile));
    let mut glyph = [0u8; 4];

    for y in 0..height {
        for x in 0..width {
            let pixel = image.get_pixel(x, y);
            let fg = override_color.unwrap_or_else(|| CellColor::from(pixel));
            let text = pixel_to_glyph(pixel).encode_utf8(&mut glyph);
            profile.push_styled(&mut out, text, Some(fg), None);
        }
        out.push('\n');
    }
    out
}

/// Half-block mode: each output row covers image rows `y` and `y + 1`,
/// top pixel as foreground and bottom pixel as background.
///
/// An odd trailing row is paired with transparent black.
pub fn render_half_blocks<I>(image: &I, profile: ColorProfile) -> String
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    let lines = height.div_ceil(2);
    let mut out = String::with_capacity(estimate_capacity(width, lines, profile));
    let mut glyph = [0u8; 4];
    let block = UPPER_HALF_BLOCK.encode_utf8(&mut glyph);

    for line in 0..lines {
        let y = line * 2;
        for x in 0..width {
            let top = CellColor::from(image.get_pixel(x, y));
            let bottom = if y + 1 < height {
                CellColor::from(image.get_pixel(x, y + 1))
            } else {
                CellColor::default()
            };
            profile.push_styled(&mut out, block, Some(top), Some(bottom));
        }
        out.push('\n');
    }
    out
}

fn estimate_capacity(width: u32, lines: u32, profile: ColorProfile) -> usize {
    let per_cell = match profile {
        ColorProfile::TrueColor => 44,
        ColorProfile::Ansi256 => 24,
        ColorProfile::Ansi16 => 16,
        ColorProfile::Ascii => 3,
    };
    (width as usize * per_cell + 1) * lines as usize
}
