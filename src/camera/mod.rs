//! Frame capture: raw frame types, sources and decoding.
//!
//! - [`FrameSource`] is the capability every producer implements
//! - [`V4l2Source`] captures YUYV frames from a V4L2 device
//! - [`FrameReader`] cuts a raw RGB888 byte stream into frames
//! - [`decode`] turns a [`RawFrame`] into an RGBA image

mod decode;
mod device;
mod errors;
mod source;
mod stream;
mod types;

pub use decode::{decode, decode_rgb, decode_yuyv, ycbcr_to_rgb, DecodeError};
pub use device::{list_formats, select_yuyv, V4l2Source, BUFFER_COUNT, WAIT_TIMEOUT};
pub use errors::SourceError;
pub use source::FrameSource;
pub use stream::FrameReader;
pub use types::{
    CameraSettings, FormatInfo, FrameOutcome, PixelFormat, RawFrame, Resolution,
};
