//! Camera types and data structures.

use std::fmt;

/// Capture resolution as negotiated with a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Default capture request (320x180), small enough for a terminal.
    pub const DEFAULT_CAPTURE: Resolution = Resolution {
        width: 320,
        height: 180,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in a frame of this size.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::DEFAULT_CAPTURE
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel layout of a raw frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Packed 4:2:2, `Y0 U Y1 V` per pixel pair (2 bytes per pixel)
    Yuyv422,
    /// Packed `R G B` (3 bytes per pixel)
    Rgb888,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Yuyv422 => 2,
            PixelFormat::Rgb888 => 3,
        }
    }

    /// Exact buffer size for a frame of the given dimensions.
    pub fn frame_len(&self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Yuyv422 => write!(f, "YUYV422"),
            PixelFormat::Rgb888 => write!(f, "RGB888"),
        }
    }
}

/// A raw frame as produced by a frame source.
///
/// Consumed once by the decoder; never retained past the tick that read it.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Raw pixel bytes in `format` layout
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel layout
    pub format: PixelFormat,
}

impl RawFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// Result of asking a source for its next frame.
#[derive(Debug)]
pub enum FrameOutcome {
    /// A complete frame
    Frame(RawFrame),
    /// The device did not deliver a frame within its wait window
    Timeout,
    /// The device delivered a zero-length buffer
    Empty,
    /// The stream closed cleanly at a frame boundary
    EndOfStream,
}

/// Settings for opening a V4L2 capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraSettings {
    /// Device node, e.g. `/dev/video0`
    pub device: String,
    /// Requested capture resolution (the device may pick another)
    pub resolution: Resolution,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            resolution: Resolution::default(),
        }
    }
}

/// A pixel format advertised by a capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    /// Enumeration index reported by the driver
    pub index: u32,
    /// FourCC code, e.g. `YUYV`
    pub fourcc: String,
    /// Driver description, e.g. `YUYV 4:2:2`
    pub description: String,
}

impl FormatInfo {
    pub fn is_yuyv(&self) -> bool {
        self.fourcc == "YUYV" || self.description.contains("YUYV")
    }

    /// The four code bytes to request from the driver, if `fourcc` is a
    /// four-byte code.
    pub fn fourcc_code(&self) -> Option<[u8; 4]> {
        self.fourcc.as_bytes().try_into().ok()
    }
}

impl fmt::Display for FormatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.fourcc, self.description)
    }
}
