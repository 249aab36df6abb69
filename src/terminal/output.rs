//! Frame sink: redraws the whole screen from the top-left corner.

use crossterm::{cursor, queue};
use std::io::{self, Write};

/// Writes rendered frames to a terminal-like writer.
pub struct TerminalOutput<W: Write> {
    writer: W,
}

impl TerminalOutput<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Move to (0, 0), write `frame`, then the FPS line if given, and flush.
    pub fn draw(&mut self, frame: &str, fps: Option<f64>) -> io::Result<()> {
        queue!(self.writer, cursor::MoveTo(0, 0))?;
        self.writer.write_all(frame.as_bytes())?;
        if let Some(fps) = fps {
            write!(self.writer, "FPS: {:.0}", fps)?;
        }
        self.writer.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
