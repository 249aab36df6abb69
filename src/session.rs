//! The per-frame loop: capture, decode, resize, mask, render, draw.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbaImage;

use crate::ascii::{self, RenderConfig};
use crate::camera::{decode, DecodeError, FrameOutcome, FrameSource, RawFrame, SourceError};
use crate::config::ConfigError;
use crate::fps::FpsEstimator;
use crate::greenscreen::{Greenscreen, GreenscreenError, RecordProgress, SampleError, SampleRecorder};
use crate::resize::Resizer;
use crate::terminal::TerminalOutput;

/// Top-level error of a run. `main` prints it and exits with status 1.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to decode frame: {0}")]
    Decode(#[from] DecodeError),

    #[error("Could not load background samples: {0}")]
    Samples(#[from] SampleError),

    #[error(transparent)]
    Greenscreen(#[from] GreenscreenError),

    #[error("Terminal output failed: {0}")]
    Terminal(#[from] io::Error),

    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Shared stop flag, checked once per tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Cancel this token on SIGINT or SIGTERM. Can only be installed once
    /// per process.
    pub fn cancel_on_signal(&self) -> Result<(), ctrlc::Error> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            log::info!("Received interrupt, shutting down");
            token.cancel();
        })
    }
}

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A frame was drawn
    Rendered,
    /// No frame this time (timeout or empty buffer)
    Skipped,
    /// The source has no more frames
    Finished,
}

/// Render session over a frame source.
pub struct Session<S, R> {
    source: S,
    resizer: R,
    greenscreen: Greenscreen,
    config: RenderConfig,
    fps: Option<FpsEstimator>,
}

impl<S: FrameSource, R: Resizer> Session<S, R> {
    pub fn new(source: S, resizer: R, greenscreen: Greenscreen, config: RenderConfig) -> Self {
        Self {
            source,
            resizer,
            greenscreen,
            config,
            fps: None,
        }
    }

    /// Print the moving-average frame rate below every frame.
    pub fn with_fps(mut self) -> Self {
        self.fps = Some(FpsEstimator::new());
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Decode a raw frame, scale it to the render geometry and apply the
    /// greenscreen.
    pub fn process(&self, raw: RawFrame) -> Result<RgbaImage, AppError> {
        let image = decode(raw)?;
        let (width, height) = self.config.image_size();
        let mut image = self.resizer.resize(image, width, height);
        self.greenscreen.apply(&mut image)?;
        Ok(image)
    }

    /// Pull one frame from the source and draw it.
    pub fn tick<W: Write>(&mut self, out: &mut TerminalOutput<W>) -> Result<Tick, AppError> {
        let raw = match self.source.next_frame()? {
            FrameOutcome::Frame(raw) => raw,
            FrameOutcome::Timeout => {
                log::warn!("Timed out waiting for a frame");
                return Ok(Tick::Skipped);
            }
            FrameOutcome::Empty => return Ok(Tick::Skipped),
            FrameOutcome::EndOfStream => {
                log::info!("Stream ended");
                return Ok(Tick::Finished);
            }
        };

        let image = self.process(raw)?;
        let text = ascii::render(&image, &self.config);
        let fps = self.fps.as_mut().map(FpsEstimator::tick);
        out.draw(&text, fps)?;
        Ok(Tick::Rendered)
    }

    /// Tick until the source ends or `cancel` fires. A tick in progress
    /// always completes.
    pub fn run<W: Write>(
        &mut self,
        out: &mut TerminalOutput<W>,
        cancel: &CancelToken,
    ) -> Result<(), AppError> {
        while !cancel.is_cancelled() {
            if self.tick(out)? == Tick::Finished {
                break;
            }
        }
        Ok(())
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

/// Write decoded frames to `recorder` until it is full, the source ends or
/// `cancel` fires. Returns the number of samples written.
///
/// Samples keep the capture resolution; they are resized when loaded.
pub fn record_samples<S: FrameSource>(
    source: &mut S,
    recorder: &mut SampleRecorder,
    cancel: &CancelToken,
) -> Result<u32, AppError> {
    while !cancel.is_cancelled() {
        match source.next_frame()? {
            FrameOutcome::Frame(raw) => {
                let image = decode(raw)?;
                if recorder.record(&image)? == RecordProgress::Done {
                    break;
                }
            }
            FrameOutcome::Timeout => log::warn!("Timed out waiting for a frame"),
            FrameOutcome::Empty => {}
            FrameOutcome::EndOfStream => {
                log::warn!("Stream ended after {} samples", recorder.written());
                break;
            }
        }
    }
    Ok(recorder.written())
}
