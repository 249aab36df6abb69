//! sRGB to CIE L*a*b* conversion (D65 white point).
//!
//! L is scaled to 0..=1 (a and b shrink by the same factor of 100), which is
//! the scale the greenscreen threshold is expressed in.

use palette::white_point::D65;
use palette::{FromColor, Srgb};

/// A color in CIE L*a*b*, L in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    /// Convert an 8-bit sRGB color.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let lab: palette::Lab<D65, f64> =
            palette::Lab::from_color(Srgb::new(r, g, b).into_format::<f64>());

        Self {
            l: lab.l / 100.0,
            a: lab.a / 100.0,
            b: lab.b / 100.0,
        }
    }

    /// Euclidean distance in Lab space.
    pub fn distance(&self, other: &Lab) -> f64 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        (dl * dl + da * da + db * db).sqrt()
    }
}
