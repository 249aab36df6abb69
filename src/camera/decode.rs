//! Raw frame decoding into RGBA images.
//!
//! Both decoders produce fully opaque pixels. Alpha is only lowered later,
//! by background subtraction.

use image::{Rgba, RgbaImage};

use super::types::{PixelFormat, RawFrame};

/// Errors for buffers that break the decoder's input contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("YUYV buffer is {actual} bytes, expected {expected} for {width}x{height}")]
    LengthMismatch {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },

    #[error("YUYV frames need an even width, got {0}")]
    OddWidth(u32),
}

/// Decode a raw frame according to its declared pixel format.
pub fn decode(frame: RawFrame) -> Result<RgbaImage, DecodeError> {
    match frame.format {
        PixelFormat::Yuyv422 => decode_yuyv(&frame.data, frame.width, frame.height),
        PixelFormat::Rgb888 => Ok(decode_rgb(&frame.data, frame.width, frame.height)),
    }
}

/// Decode a packed YUYV 4:2:2 buffer.
///
/// Every 4-byte group `Y0 U Y1 V` holds two horizontally adjacent pixels
/// that share one chroma pair. The buffer must be exactly
/// `width * height * 2` bytes.
pub fn decode_yuyv(data: &[u8], width: u32, height: u32) -> Result<RgbaImage, DecodeError> {
    let expected = PixelFormat::Yuyv422.frame_len(width, height);
    if data.len() != expected {
        return Err(DecodeError::LengthMismatch {
            expected,
            actual: data.len(),
            width,
            height,
        });
    }
    if width % 2 != 0 {
        return Err(DecodeError::OddWidth(width));
    }

    let mut rgba = Vec::with_capacity(expected * 2);
    for group in data.chunks_exact(4) {
        let (y0, cb, y1, cr) = (group[0], group[1], group[2], group[3]);
        let [r, g, b] = ycbcr_to_rgb(y0, cb, cr);
        rgba.extend_from_slice(&[r, g, b, 255]);
        let [r, g, b] = ycbcr_to_rgb(y1, cb, cr);
        rgba.extend_from_slice(&[r, g, b, 255]);
    }

    RgbaImage::from_raw(width, height, rgba).ok_or(DecodeError::LengthMismatch {
        expected,
        actual: data.len(),
        width,
        height,
    })
}

/// Decode a packed RGB888 buffer.
///
/// Pixels past the end of a short buffer keep the default transparent
/// black instead of failing the whole frame.
pub fn decode_rgb(data: &[u8], width: u32, height: u32) -> RgbaImage {
    let mut image = RgbaImage::new(width, height);
    for (pixel, rgb) in image.pixels_mut().zip(data.chunks_exact(3)) {
        *pixel = Rgba([rgb[0], rgb[1], rgb[2], 255]);
    }
    image
}

/// Full-range (JFIF) BT.601 YCbCr to RGB, in 16.16 fixed point.
///
/// `y * 0x10101` scales 0..=255 onto 0..=0xFFFFFF so that full-scale luma
/// with neutral chroma maps to exactly 255.
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let yy = i32::from(y) * 0x10101;
    let cb = i32::from(cb) - 128;
    let cr = i32::from(cr) - 128;

    let r = yy + 91_881 * cr;
    let g = yy - 22_554 * cb - 46_802 * cr;
    let b = yy + 116_130 * cb;

    [clamp_fixed(r), clamp_fixed(g), clamp_fixed(b)]
}

#[inline]
fn clamp_fixed(v: i32) -> u8 {
    (v >> 16).clamp(0, 255) as u8
}
