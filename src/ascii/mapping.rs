//! Pixel intensity to glyph mapping.

use image::Rgba;

use super::charset::{FULL_SPAN, GLYPH_RAMP};

/// Alpha-weighted channel sum of a pixel, `0..=765`.
///
/// A fully transparent pixel has intensity 0 whatever its color.
#[inline]
pub fn intensity(pixel: Rgba<u8>) -> u32 {
    let [r, g, b, a] = pixel.0;
    (u32::from(r) + u32::from(g) + u32::from(b)) * u32::from(a) / 255
}

/// Intensity covered by one ramp step, truncated to an integer.
///
/// For the standard 15-glyph ramp this is `765 / 14 = 54`.
#[inline]
pub fn bucket_width(ramp_len: usize) -> u32 {
    FULL_SPAN / (ramp_len.max(2) as u32 - 1)
}

/// Ramp index for an intensity: `intensity / bucket` rounded half up,
/// clamped to the last glyph.
///
/// The truncated bucket width means the top of the range rounds past the
/// end of the ramp; those values clamp to the densest glyph.
pub fn glyph_index(intensity: u32, ramp_len: usize) -> usize {
    if ramp_len <= 1 {
        return 0;
    }
    let bucket = bucket_width(ramp_len);
    let index = (2 * intensity + bucket) / (2 * bucket);
    (index as usize).min(ramp_len - 1)
}

/// Glyph for a pixel using the standard ramp.
#[inline]
pub fn pixel_to_glyph(pixel: Rgba<u8>) -> char {
    GLYPH_RAMP[glyph_index(intensity(pixel), GLYPH_RAMP.len())]
}
