//! Error types for frame sources.
//!
//! Covers both the V4L2 device source and the child-process pixel stream.

use std::io;

/// Errors that can occur while starting or reading a frame source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Device node could not be opened
    #[error("Failed to open capture device '{device}': {source}")]
    Open { device: String, source: io::Error },

    /// Device format list could not be read
    #[error("Failed to list formats of '{device}': {source}")]
    QueryFormats { device: String, source: io::Error },

    /// Device offers no YUYV format
    #[error("Capture device '{device}' does not offer a YUYV format")]
    NoYuyvFormat { device: String },

    /// Driver rejected the requested format
    #[error("Failed to set image format on '{device}': {source}")]
    Negotiate { device: String, source: io::Error },

    /// Driver accepted the request but switched to another pixel format
    #[error("Capture device '{device}' negotiated {fourcc} instead of {requested}")]
    FormatChanged {
        device: String,
        requested: String,
        fourcc: String,
    },

    /// Buffer allocation or STREAMON failed
    #[error("Failed to start streaming on '{device}': {source}")]
    Stream { device: String, source: io::Error },

    /// Waiting for or dequeuing a frame failed
    #[error("Failed waiting for frame: {0}")]
    Wait(#[source] io::Error),

    /// Child process could not be launched
    #[error("Failed to start '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    /// Child process was started without a stdout pipe
    #[error("'{program}' has no stdout pipe")]
    NoStdout { program: String },

    /// Reading the child's stdout failed
    #[error("Failed to read from pipeline output: {0}")]
    Read(#[source] io::Error),

    /// This build has no device capture backend
    #[error("Device capture is not available in this build. Rebuild with the `v4l2` feature, or use --gst")]
    Unsupported,
}
