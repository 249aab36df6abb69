//! GStreamer pipeline management for asciicam.
//!
//! This module spawns `gst-launch-1.0`, reads raw RGB888 frames from its
//! stdout and terminates the process when the session ends.

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::camera::{FrameOutcome, FrameReader, FrameSource, Resolution, SourceError};

/// Executable that runs pipeline descriptions.
pub const GST_LAUNCH: &str = "gst-launch-1.0";

/// How long a signalled child gets to exit before it is killed.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Build the argument list for a pipeline description.
///
/// `-e` makes gst-launch send EOS on SIGINT so the pipeline shuts down
/// cleanly. The description is split on whitespace; quoting is not
/// interpreted.
pub fn pipeline_args(description: &str) -> Vec<String> {
    std::iter::once("-e".to_string())
        .chain(description.split_whitespace().map(str::to_string))
        .collect()
}

/// A running child process whose stdout carries raw RGB888 frames.
pub struct PipeSource {
    /// The child process
    child: Child,
    /// Frame reader over the child's stdout; `None` once closed
    reader: Option<FrameReader<BufReader<ChildStdout>>>,
    /// Forwards the child's stderr to the logger
    stderr_thread: Option<JoinHandle<()>>,
    /// Program name, for messages
    program: String,
    /// Frame size read per tick
    resolution: Resolution,
    /// Set once the child has been signalled and reaped
    terminated: bool,
}

impl std::fmt::Debug for PipeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeSource")
            .field("program", &self.program)
            .field("pid", &self.child.id())
            .field("resolution", &self.resolution)
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}

impl PipeSource {
    /// Launch `gst-launch-1.0 -e <description>`.
    ///
    /// The pipeline must write headerless RGB888 frames of `resolution`
    /// to stdout (e.g. ending in `fdsink fd=1`).
    pub fn spawn(description: &str, resolution: Resolution) -> Result<Self, SourceError> {
        Self::spawn_program(GST_LAUNCH, &pipeline_args(description), resolution)
    }

    /// Launch an arbitrary program that writes RGB888 frames to stdout.
    pub fn spawn_program(
        program: &str,
        args: &[String],
        resolution: Resolution,
    ) -> Result<Self, SourceError> {
        log::info!("Starting {} {}", program, args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SourceError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SourceError::NoStdout {
                program: program.to_string(),
            });
        };

        // The screen belongs to the renderer, so stderr goes to the log instead
        let stderr_thread = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let reader = BufReader::new(stderr);
                for line in reader.lines() {
                    match line {
                        Ok(l) => log::debug!("[gst] {}", l),
                        Err(_) => break,
                    }
                }
            })
        });

        Ok(Self {
            child,
            reader: Some(FrameReader::new(BufReader::new(stdout), resolution)),
            stderr_thread,
            program: program.to_string(),
            resolution,
            terminated: false,
        })
    }

    /// Process ID of the child.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Check if the child is still running.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Close the pipe and stop the child. Safe to call more than once.
    ///
    /// Sends SIGINT (so `-e` can flush EOS) and waits up to
    /// [`SHUTDOWN_GRACE`] before falling back to SIGKILL.
    pub fn shutdown(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;

        // Closing our end first unblocks a child stuck writing a frame
        drop(self.reader.take());

        if self.is_running() {
            interrupt(&mut self.child);

            let start = Instant::now();
            loop {
                match self.child.try_wait() {
                    Ok(Some(_)) => break,
                    Ok(None) if start.elapsed() > SHUTDOWN_GRACE => {
                        log::warn!("{} ignored SIGINT, killing it", self.program);
                        let _ = self.child.kill();
                        let _ = self.child.wait();
                        break;
                    }
                    Ok(None) => thread::sleep(Duration::from_millis(50)),
                    Err(e) => {
                        log::warn!("Failed to wait for {}: {}", self.program, e);
                        break;
                    }
                }
            }
        } else {
            let _ = self.child.wait();
        }

        if let Some(handle) = self.stderr_thread.take() {
            let _ = handle.join();
        }
        log::debug!("{} stopped", self.program);
    }
}

impl FrameSource for PipeSource {
    fn next_frame(&mut self) -> Result<FrameOutcome, SourceError> {
        match self.reader.as_mut() {
            Some(reader) => reader.read_frame(),
            None => Ok(FrameOutcome::EndOfStream),
        }
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }
}

impl Drop for PipeSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(unix)]
fn interrupt(child: &mut Child) {
    let pid = child.id() as libc::pid_t;
    // SAFETY: kill(2) with a pid we own; failure only means it already exited
    unsafe {
        libc::kill(pid, libc::SIGINT);
    }
}

#[cfg(not(unix))]
fn interrupt(child: &mut Child) {
    let _ = child.kill();
}
