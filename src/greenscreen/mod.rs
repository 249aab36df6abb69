//! Virtual greenscreen: mask pixels that match a reference background.
//!
//! Each pixel is compared with the background pixel at the same
//! coordinate in CIE L*a*b*. Pixels closer than the threshold become fully
//! transparent; everything else is left untouched. The threshold is an
//! absolute Lab distance with L scaled to 0..=1.

mod lab;
mod samples;

use image::{Rgba, RgbaImage};

use crate::resize::Resizer;

pub use lab::Lab;
pub use samples::{
    RecordProgress, SampleError, SampleRecorder, SampleStore, DEFAULT_SAMPLE_INDEX, SAMPLE_COUNT,
};

/// Default Lab distance below which a pixel counts as background.
pub const DEFAULT_THRESHOLD: f64 = 0.13;

/// What a masked pixel is replaced with.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GreenscreenError {
    #[error("Background is {background:?} but frame is {frame:?}")]
    DimensionMismatch {
        frame: (u32, u32),
        background: (u32, u32),
    },
}

/// A background image with its Lab values precomputed.
#[derive(Debug, Clone)]
pub struct BackgroundModel {
    width: u32,
    height: u32,
    lab: Vec<Lab>,
}

impl BackgroundModel {
    pub fn new(background: &RgbaImage) -> Self {
        let lab = background
            .pixels()
            .map(|p| Lab::from_rgb(p[0], p[1], p[2]))
            .collect();
        Self {
            width: background.width(),
            height: background.height(),
            lab,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Mask every pixel of `image` within `threshold` of the background.
    ///
    /// Returns how many pixels were masked.
    pub fn subtract(&self, image: &mut RgbaImage, threshold: f64) -> Result<usize, GreenscreenError> {
        if image.dimensions() != self.dimensions() {
            return Err(GreenscreenError::DimensionMismatch {
                frame: image.dimensions(),
                background: self.dimensions(),
            });
        }

        let mut masked = 0;
        for (pixel, bg) in image.pixels_mut().zip(&self.lab) {
            let lab = Lab::from_rgb(pixel[0], pixel[1], pixel[2]);
            if lab.distance(bg) < threshold {
                *pixel = TRANSPARENT;
                masked += 1;
            }
        }
        Ok(masked)
    }
}

/// Mask pixels of `image` that are within `threshold` of `background`.
pub fn subtract_background(
    image: &mut RgbaImage,
    background: &RgbaImage,
    threshold: f64,
) -> Result<usize, GreenscreenError> {
    BackgroundModel::new(background).subtract(image, threshold)
}

/// The subtraction stage of the render loop. Without a background it
/// leaves frames untouched.
#[derive(Debug, Clone)]
pub struct Greenscreen {
    background: Option<BackgroundModel>,
    threshold: f64,
}

impl Default for Greenscreen {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Greenscreen {
    pub fn disabled() -> Self {
        Self {
            background: None,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn new(background: &RgbaImage, threshold: f64) -> Self {
        Self {
            background: Some(BackgroundModel::new(background)),
            threshold,
        }
    }

    /// Load sample `index` from `store`, resized to the render geometry.
    pub fn load<R: Resizer>(
        store: &SampleStore,
        index: u32,
        width: u32,
        height: u32,
        threshold: f64,
        resizer: &R,
    ) -> Result<Self, SampleError> {
        let sample = store.read(index)?;
        let background = resizer.resize(sample, width, height);
        log::info!(
            "Loaded background sample {} ({}x{}, threshold {})",
            store.path_for(index).display(),
            width,
            height,
            threshold
        );
        Ok(Self::new(&background, threshold))
    }

    pub fn is_enabled(&self) -> bool {
        self.background.is_some()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn apply(&self, image: &mut RgbaImage) -> Result<(), GreenscreenError> {
        match &self.background {
            Some(model) => model.subtract(image, self.threshold).map(|_| ()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_pixels_are_masked() {
        let background = RgbaImage::from_pixel(3, 3, Rgba([0, 180, 40, 255]));
        let mut frame = background.clone();
        let masked = subtract_background(&mut frame, &background, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(masked, 9);
        assert!(frame.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_distant_pixels_keep_alpha() {
        let background = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let mut frame = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        let masked = subtract_background(&mut frame, &background, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(masked, 0);
        assert!(frame.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_distance_equal_to_threshold_is_kept() {
        // Black vs white is exactly 1.0 apart; "< 1.0" must not mask
        let background = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let mut frame = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]));
        let d = Lab::from_rgb(0, 0, 0).distance(&Lab::from_rgb(255, 255, 255));
        subtract_background(&mut frame, &background, d).unwrap();
        assert_eq!(frame.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_only_matching_coordinates_are_masked() {
        let mut background = RgbaImage::from_pixel(2, 1, Rgba([20, 20, 200, 255]));
        background.put_pixel(1, 0, Rgba([250, 250, 0, 255]));
        let mut frame = RgbaImage::from_pixel(2, 1, Rgba([20, 20, 200, 255]));

        subtract_background(&mut frame, &background, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(frame.get_pixel(0, 0), &TRANSPARENT);
        assert_eq!(frame.get_pixel(1, 0), &Rgba([20, 20, 200, 255]));
    }

    #[test]
    fn test_dimension_mismatch() {
        let background = RgbaImage::new(2, 2);
        let mut frame = RgbaImage::new(3, 2);
        let err = subtract_background(&mut frame, &background, 0.5).unwrap_err();
        assert_eq!(
            err,
            GreenscreenError::DimensionMismatch {
                frame: (3, 2),
                background: (2, 2)
            }
        );
    }

    #[test]
    fn test_disabled_is_noop() {
        let greenscreen = Greenscreen::disabled();
        assert!(!greenscreen.is_enabled());
        let mut frame = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
        let before = frame.clone();
        greenscreen.apply(&mut frame).unwrap();
        assert_eq!(frame, before);
    }

    #[test]
    fn test_load_resizes_sample() {
        use crate::resize::Bilinear;

        let temp = tempfile::TempDir::new().unwrap();
        let store = SampleStore::new(temp.path());
        let sample = RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255]));
        store.write(DEFAULT_SAMPLE_INDEX, &sample).unwrap();

        let greenscreen =
            Greenscreen::load(&store, DEFAULT_SAMPLE_INDEX, 4, 2, 0.2, &Bilinear).unwrap();
        assert!(greenscreen.is_enabled());
        assert_eq!(greenscreen.threshold(), 0.2);

        let mut frame = RgbaImage::from_pixel(4, 2, Rgba([0, 255, 0, 255]));
        greenscreen.apply(&mut frame).unwrap();
        assert!(frame.pixels().all(|p| p[3] == 0));
    }
}
