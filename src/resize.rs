//! Image resampling to the render geometry.

use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Resample an image to an exact target size.
pub trait Resizer {
    fn resize(&self, image: RgbaImage, width: u32, height: u32) -> RgbaImage;
}

/// Bilinear resampling via `image::imageops`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bilinear;

impl Resizer for Bilinear {
    fn resize(&self, image: RgbaImage, width: u32, height: u32) -> RgbaImage {
        if image.dimensions() == (width, height) {
            return image;
        }
        imageops::resize(&image, width, height, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_resize_to_target_dimensions() {
        let image = RgbaImage::from_pixel(8, 6, Rgba([10, 20, 30, 255]));
        let out = Bilinear.resize(image, 4, 3);
        assert_eq!(out.dimensions(), (4, 3));
        // A flat image stays flat
        assert!(out.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_resize_upscale() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        let out = Bilinear.resize(image, 5, 4);
        assert_eq!(out.dimensions(), (5, 4));
    }

    #[test]
    fn test_resize_same_size_is_identity() {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(1, 1, Rgba([1, 2, 3, 4]));
        let out = Bilinear.resize(image.clone(), 3, 2);
        assert_eq!(out, image);
    }
}
