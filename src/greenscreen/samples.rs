//! Background sample store: numbered PNG files in a directory.

use std::path::PathBuf;

use image::{ImageFormat, RgbaImage};

/// Frames written by one sample-capture run (indices `0..SAMPLE_COUNT`).
pub const SAMPLE_COUNT: u32 = 101;

/// Sample used for chroma keying unless configured otherwise.
pub const DEFAULT_SAMPLE_INDEX: u32 = 40;

/// Errors reading or writing background samples.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("Failed to create sample directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write sample '{path}': {source}")]
    Write {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to read sample '{path}': {source}")]
    Read {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Directory of `<index>.png` background samples.
#[derive(Debug, Clone)]
pub struct SampleStore {
    dir: PathBuf,
}

impl SampleStore {
    /// Does not create the directory; writes call [`ensure_dir_exists`](Self::ensure_dir_exists).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the sample with the given index.
    pub fn path_for(&self, index: u32) -> PathBuf {
        self.dir.join(format!("{}.png", index))
    }

    pub fn ensure_dir_exists(&self) -> Result<(), SampleError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SampleError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }

    /// Encode `image` as PNG under `index`, replacing any existing file.
    pub fn write(&self, index: u32, image: &RgbaImage) -> Result<PathBuf, SampleError> {
        self.ensure_dir_exists()?;
        let path = self.path_for(index);
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| SampleError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Decode the sample stored under `index`.
    pub fn read(&self, index: u32) -> Result<RgbaImage, SampleError> {
        let path = self.path_for(index);
        let image = image::open(&path).map_err(|source| SampleError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(image.to_rgba8())
    }
}

/// Whether sample capture should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordProgress {
    /// More frames are needed
    Continue,
    /// The last sample has been written
    Done,
}

/// Writes consecutive frames into a [`SampleStore`] until it has
/// [`SAMPLE_COUNT`] of them.
#[derive(Debug)]
pub struct SampleRecorder {
    store: SampleStore,
    next_index: u32,
    limit: u32,
}

impl SampleRecorder {
    pub fn new(store: SampleStore) -> Self {
        Self::with_limit(store, SAMPLE_COUNT)
    }

    pub fn with_limit(store: SampleStore, limit: u32) -> Self {
        Self {
            store,
            next_index: 0,
            limit,
        }
    }

    /// Number of samples written so far.
    pub fn written(&self) -> u32 {
        self.next_index
    }

    pub fn record(&mut self, image: &RgbaImage) -> Result<RecordProgress, SampleError> {
        if self.next_index >= self.limit {
            return Ok(RecordProgress::Done);
        }

        let path = self.store.write(self.next_index, image)?;
        log::debug!("Wrote background sample {}", path.display());
        self.next_index += 1;

        if self.next_index >= self.limit {
            Ok(RecordProgress::Done)
        } else {
            Ok(RecordProgress::Continue)
        }
    }
}
