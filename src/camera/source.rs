//! The frame source capability shared by every producer.

use super::errors::SourceError;
use super::types::{FrameOutcome, Resolution};

/// Something that yields raw frames one at a time.
///
/// Implemented by [`V4l2Source`](super::V4l2Source) and
/// [`PipeSource`](crate::pipeline::PipeSource). Calls may block, but each
/// implementation bounds how long.
pub trait FrameSource {
    /// Read the next frame, or report why there is none this tick.
    fn next_frame(&mut self) -> Result<FrameOutcome, SourceError>;

    /// Dimensions of the frames this source produces.
    ///
    /// For devices this is the negotiated size, which may differ from the
    /// requested one.
    fn resolution(&self) -> Resolution;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<FrameOutcome, SourceError> {
        (**self).next_frame()
    }

    fn resolution(&self) -> Resolution {
        (**self).resolution()
    }
}
