//! V4L2 capture device source.
//!
//! Opens a device node, picks the first format advertising YUYV, negotiates
//! the capture size and streams through a single mmap buffer. With one
//! buffer there is no frame queue: a frame the loop has not collected yet is
//! overwritten by the driver.

use std::io::{self, ErrorKind};
use std::time::Duration;

use super::errors::SourceError;
use super::types::{FormatInfo, FrameOutcome, PixelFormat, RawFrame, Resolution};

/// How long `next_frame` waits for the driver before reporting a timeout.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Number of driver buffers requested.
pub const BUFFER_COUNT: u32 = 1;

/// Pick the first YUYV-capable format, in driver enumeration order.
pub fn select_yuyv(formats: &[FormatInfo]) -> Option<&FormatInfo> {
    formats.iter().find(|f| f.is_yuyv())
}

/// The part of a driver buffer stream that frame polling needs.
#[cfg_attr(not(all(target_os = "linux", feature = "v4l2")), allow(dead_code))]
pub(crate) trait DriverStream {
    /// Queue the buffer, wait for the driver and return the bytes it filled.
    fn next_buffer(&mut self) -> io::Result<&[u8]>;

    /// STREAMOFF: hand every queued buffer back to userspace.
    fn stop(&mut self) -> io::Result<()>;
}

/// Pull one YUYV frame from `stream`.
///
/// A wait timeout leaves the buffer queued in the driver, and queueing it
/// again on the next call fails. The stream is stopped before reporting the
/// timeout so the next call restarts it with a fresh queue.
#[cfg_attr(not(all(target_os = "linux", feature = "v4l2")), allow(dead_code))]
pub(crate) fn pull_frame<D: DriverStream>(
    stream: &mut D,
    resolution: Resolution,
) -> Result<FrameOutcome, SourceError> {
    let data = match stream.next_buffer() {
        Ok(data) => data.to_vec(),
        Err(e) if e.kind() == ErrorKind::TimedOut => {
            stream.stop().map_err(SourceError::Wait)?;
            return Ok(FrameOutcome::Timeout);
        }
        Err(e) => return Err(SourceError::Wait(e)),
    };

    if data.is_empty() {
        return Ok(FrameOutcome::Empty);
    }

    Ok(FrameOutcome::Frame(RawFrame::new(
        data,
        resolution.width,
        resolution.height,
        PixelFormat::Yuyv422,
    )))
}

#[cfg(all(target_os = "linux", feature = "v4l2"))]
mod imp {
    use std::io;

    use v4l::buffer::Type;
    use v4l::io::mmap::Stream as MmapStream;
    use v4l::io::traits::{CaptureStream, Stream};
    use v4l::video::Capture;
    use v4l::{Device, Format, FourCC};

    use super::super::errors::SourceError;
    use super::super::source::FrameSource;
    use super::super::types::{CameraSettings, FormatInfo, FrameOutcome, Resolution};
    use super::{pull_frame, select_yuyv, DriverStream, BUFFER_COUNT, WAIT_TIMEOUT};

    /// A streaming V4L2 device.
    pub struct V4l2Source {
        // Dropped before `_device`: stopping the stream needs the handle open.
        stream: MmapStream<'static>,
        _device: Device,
        path: String,
        resolution: Resolution,
    }

    impl std::fmt::Debug for V4l2Source {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("V4l2Source")
                .field("path", &self.path)
                .field("resolution", &self.resolution)
                .finish_non_exhaustive()
        }
    }

    impl V4l2Source {
        /// Open the device and map its buffers. Streaming starts with the
        /// first `next_frame`.
        ///
        /// # Errors
        /// * `SourceError::Open` - the device node cannot be opened
        /// * `SourceError::NoYuyvFormat` - no advertised format is YUYV
        /// * `SourceError::Negotiate` / `FormatChanged` - the driver refused the format
        /// * `SourceError::Stream` - buffers could not be mapped
        pub fn open(settings: &CameraSettings) -> Result<Self, SourceError> {
            let path = settings.device.clone();
            let device = Device::with_path(&path).map_err(|source| SourceError::Open {
                device: path.clone(),
                source,
            })?;

            let formats = enumerate(&device, &path)?;
            for format in &formats {
                log::debug!("{}: {}", path, format);
            }
            let chosen = select_yuyv(&formats).ok_or_else(|| SourceError::NoYuyvFormat {
                device: path.clone(),
            })?;

            let code = chosen
                .fourcc_code()
                .ok_or_else(|| SourceError::NoYuyvFormat {
                    device: path.clone(),
                })?;
            let fourcc = FourCC::new(&code);
            let requested = Format::new(
                settings.resolution.width,
                settings.resolution.height,
                fourcc,
            );
            let actual = device
                .set_format(&requested)
                .map_err(|source| SourceError::Negotiate {
                    device: path.clone(),
                    source,
                })?;
            if actual.fourcc != fourcc {
                return Err(SourceError::FormatChanged {
                    device: path,
                    requested: chosen.fourcc.clone(),
                    fourcc: actual.fourcc.to_string(),
                });
            }

            let resolution = Resolution::new(actual.width, actual.height);
            if resolution != settings.resolution {
                log::info!(
                    "{}: requested {} but driver chose {}",
                    path,
                    settings.resolution,
                    resolution
                );
            }

            let mut stream = MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)
                .map_err(|source| SourceError::Stream {
                    device: path.clone(),
                    source,
                })?;
            stream.set_timeout(WAIT_TIMEOUT);

            log::info!(
                "{}: streaming {} at {}",
                path,
                chosen.description,
                resolution
            );

            Ok(Self {
                stream,
                _device: device,
                path,
                resolution,
            })
        }
    }

    impl DriverStream for MmapStream<'static> {
        fn next_buffer(&mut self) -> io::Result<&[u8]> {
            let (buf, meta) = CaptureStream::next(self)?;
            let used = (meta.bytesused as usize).min(buf.len());
            Ok(&buf[..used])
        }

        fn stop(&mut self) -> io::Result<()> {
            Stream::stop(self)
        }
    }

    impl FrameSource for V4l2Source {
        fn next_frame(&mut self) -> Result<FrameOutcome, SourceError> {
            pull_frame(&mut self.stream, self.resolution)
        }

        fn resolution(&self) -> Resolution {
            self.resolution
        }
    }

    impl Drop for V4l2Source {
        fn drop(&mut self) {
            // The mmap stream issues STREAMOFF when it is dropped.
            log::debug!("{}: stopping stream", self.path);
        }
    }

    fn enumerate(device: &Device, path: &str) -> Result<Vec<FormatInfo>, SourceError> {
        let descriptions = device
            .enum_formats()
            .map_err(|source| SourceError::QueryFormats {
                device: path.to_string(),
                source,
            })?;

        Ok(descriptions
            .into_iter()
            .map(|d| FormatInfo {
                index: d.index,
                fourcc: d.fourcc.to_string(),
                description: d.description,
            })
            .collect())
    }

    /// List the pixel formats a device advertises.
    pub fn list_formats(path: &str) -> Result<Vec<FormatInfo>, SourceError> {
        let device = Device::with_path(path).map_err(|source| SourceError::Open {
            device: path.to_string(),
            source,
        })?;
        enumerate(&device, path)
    }
}

#[cfg(not(all(target_os = "linux", feature = "v4l2")))]
mod imp {
    use std::convert::Infallible;

    use super::super::errors::SourceError;
    use super::super::source::FrameSource;
    use super::super::types::{CameraSettings, FormatInfo, FrameOutcome, Resolution};

    /// Placeholder for builds without a V4L2 backend; cannot be constructed.
    #[derive(Debug)]
    pub struct V4l2Source {
        never: Infallible,
    }

    impl V4l2Source {
        pub fn open(_settings: &CameraSettings) -> Result<Self, SourceError> {
            Err(SourceError::Unsupported)
        }
    }

    impl FrameSource for V4l2Source {
        fn next_frame(&mut self) -> Result<FrameOutcome, SourceError> {
            match self.never {}
        }

        fn resolution(&self) -> Resolution {
            match self.never {}
        }
    }

    pub fn list_formats(_path: &str) -> Result<Vec<FormatInfo>, SourceError> {
        Err(SourceError::Unsupported)
    }
}

pub use imp::{list_formats, V4l2Source};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn format(index: u32, fourcc: &str, description: &str) -> FormatInfo {
        FormatInfo {
            index,
            fourcc: fourcc.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_select_yuyv_picks_first_match() {
        let formats = vec![
            format(0, "MJPG", "Motion-JPEG"),
            format(1, "YUYV", "YUYV 4:2:2"),
            format(2, "YUYV", "YUYV 4:2:2 (alt)"),
        ];
        let chosen = select_yuyv(&formats).unwrap();
        assert_eq!(chosen.index, 1);
    }

    #[test]
    fn test_select_yuyv_by_description_keeps_its_code() {
        let formats = vec![format(0, "MJPG", "Motion-JPEG"), format(1, "YUY2", "YUYV 4:2:2")];
        let chosen = select_yuyv(&formats).unwrap();
        assert_eq!(chosen.fourcc_code(), Some(*b"YUY2"));
    }

    #[test]
    fn test_select_yuyv_none() {
        let formats = vec![format(0, "MJPG", "Motion-JPEG"), format(1, "NV12", "Y/CbCr 4:2:0")];
        assert!(select_yuyv(&formats).is_none());
        assert!(select_yuyv(&[]).is_none());
    }

    /// Single-buffer driver: a buffer left queued by a timeout cannot be
    /// queued again until the stream is stopped.
    struct FakeDriver {
        results: VecDeque<io::Result<Vec<u8>>>,
        queued: bool,
        filled: Vec<u8>,
        stops: u32,
    }

    impl FakeDriver {
        fn new(results: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                results: results.into(),
                queued: false,
                filled: Vec::new(),
                stops: 0,
            }
        }
    }

    impl DriverStream for FakeDriver {
        fn next_buffer(&mut self) -> io::Result<&[u8]> {
            if self.queued {
                return Err(io::Error::new(ErrorKind::InvalidInput, "VIDIOC_QBUF"));
            }
            self.queued = true;
            let data = self
                .results
                .pop_front()
                .unwrap_or_else(|| Err(io::Error::new(ErrorKind::TimedOut, "VIDIOC_DQBUF")))?;
            self.queued = false;
            self.filled = data;
            Ok(self.filled.as_slice())
        }

        fn stop(&mut self) -> io::Result<()> {
            self.queued = false;
            self.stops += 1;
            Ok(())
        }
    }

    fn timed_out() -> io::Result<Vec<u8>> {
        Err(io::Error::new(ErrorKind::TimedOut, "VIDIOC_DQBUF"))
    }

    #[test]
    fn test_timeout_then_frame() {
        let mut driver = FakeDriver::new(vec![timed_out(), timed_out(), Ok(vec![16, 128, 16, 128])]);
        let res = Resolution::new(2, 1);

        assert!(matches!(pull_frame(&mut driver, res).unwrap(), FrameOutcome::Timeout));
        assert!(matches!(pull_frame(&mut driver, res).unwrap(), FrameOutcome::Timeout));
        assert_eq!(driver.stops, 2);

        match pull_frame(&mut driver, res).unwrap() {
            FrameOutcome::Frame(raw) => {
                assert_eq!(raw.data, vec![16, 128, 16, 128]);
                assert_eq!(raw.format, PixelFormat::Yuyv422);
                assert_eq!(raw.resolution(), res);
            }
            other => panic!("Expected a frame, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_buffer_is_not_a_frame() {
        let mut driver = FakeDriver::new(vec![Ok(Vec::new())]);
        let outcome = pull_frame(&mut driver, Resolution::new(2, 1)).unwrap();
        assert!(matches!(outcome, FrameOutcome::Empty));
        assert_eq!(driver.stops, 0);
    }

    #[test]
    fn test_other_driver_errors_are_fatal() {
        let mut driver = FakeDriver::new(vec![Err(io::Error::new(ErrorKind::Other, "ENODEV"))]);
        match pull_frame(&mut driver, Resolution::new(2, 1)) {
            Err(SourceError::Wait(e)) => assert_eq!(e.kind(), ErrorKind::Other),
            other => panic!("Expected a wait error, got {:?}", other),
        }
    }

    #[cfg(not(all(target_os = "linux", feature = "v4l2")))]
    #[test]
    fn test_open_without_backend_is_unsupported() {
        use super::super::errors::SourceError;
        use super::super::types::CameraSettings;

        let result = V4l2Source::open(&CameraSettings::default());
        assert!(matches!(result, Err(SourceError::Unsupported)));
        assert!(matches!(list_formats("/dev/video0"), Err(SourceError::Unsupported)));
    }
}
