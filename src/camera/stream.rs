//! Fixed-size frame reader over a raw RGB888 byte stream.

use std::io::{ErrorKind, Read};

use super::errors::SourceError;
use super::types::{FrameOutcome, PixelFormat, RawFrame, Resolution};

/// Reads headerless, row-major RGB888 frames in lockstep from a byte stream.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    resolution: Resolution,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R, resolution: Resolution) -> Self {
        Self { reader, resolution }
    }

    /// Number of bytes in one frame.
    pub fn frame_len(&self) -> usize {
        PixelFormat::Rgb888.frame_len(self.resolution.width, self.resolution.height)
    }

    /// Block until one full frame has been read.
    ///
    /// EOF before the first byte of a frame is a clean end of stream. EOF
    /// partway through a frame also ends the stream (the writer exited while
    /// flushing); the partial frame is dropped. Any other I/O error is fatal.
    pub fn read_frame(&mut self) -> Result<FrameOutcome, SourceError> {
        let len = self.frame_len();
        let mut data = vec![0u8; len];
        let mut filled = 0;

        while filled < len {
            match self.reader.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(SourceError::Read(e)),
            }
        }

        if filled == 0 {
            return Ok(FrameOutcome::EndOfStream);
        }
        if filled < len {
            log::warn!(
                "Stream ended mid-frame ({} of {} bytes), dropping partial frame",
                filled,
                len
            );
            return Ok(FrameOutcome::EndOfStream);
        }

        Ok(FrameOutcome::Frame(RawFrame::new(
            data,
            self.resolution.width,
            self.resolution.height,
            PixelFormat::Rgb888,
        )))
    }
}
