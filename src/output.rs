//! Scoped HTML output files.
//!
//! A [`Destination`] writes into a randomized temp file next to its target
//! and only replaces the target on [`Destination::commit`]. Dropping a
//! destination without committing (an error path, a panic) removes the temp
//! file, so an aborted run never leaves a half-written page behind.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Output path has no file name: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to {action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error<'a>(
    action: &'static str,
    path: &'a Path,
) -> impl FnOnce(std::io::Error) -> OutputError + 'a {
    move |source| OutputError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// An output file that exists at its final path only once committed.
#[derive(Debug)]
pub struct Destination {
    path: PathBuf,
    temp_path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl Destination {
    /// Opens a fresh temp file beside `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let path = path.into();
        let file_name = path
            .file_name()
            .ok_or_else(|| OutputError::InvalidPath(path.clone()))?
            .to_string_lossy()
            .into_owned();

        // Randomized temp filename so a pre-planted symlink cannot be targeted
        let random_suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let temp_path = path.with_file_name(format!(".{}.tmp.{:016x}", file_name, random_suffix));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(io_error("create temporary file", &temp_path))?;

        tracing::debug!(path = %path.display(), temp = %temp_path.display(), "Opened output");

        Ok(Self {
            path,
            temp_path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Appends one rendered fragment.
    pub fn write_fragment(&mut self, fragment: &str) -> Result<(), OutputError> {
        self.write_all(fragment.as_bytes())
            .map_err(io_error("write", &self.temp_path))
    }

    /// Flushes, syncs and atomically renames the temp file over the target.
    pub fn commit(mut self) -> Result<PathBuf, OutputError> {
        if let Some(writer) = self.writer.take() {
            let file = writer
                .into_inner()
                .map_err(|e| e.into_error())
                .map_err(io_error("flush", &self.temp_path))?;
            file.sync_all()
                .map_err(io_error("sync", &self.temp_path))?;
        }

        // On Windows, rename fails if the destination exists
        #[cfg(windows)]
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(io_error("replace", &self.path))?;
        }

        std::fs::rename(&self.temp_path, &self.path).map_err(io_error("rename", &self.path))?;
        tracing::debug!(path = %self.path.display(), "Committed output");
        Ok(std::mem::take(&mut self.path))
    }
}

impl Write for Destination {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.writer.as_mut() {
            Some(writer) => writer.write(buf),
            None => Err(std::io::Error::other("destination already committed")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for Destination {
    fn drop(&mut self) {
        // Uncommitted: discard the partial output
        if self.writer.take().is_some() || self.temp_path.exists() {
            let _ = std::fs::remove_file(&self.temp_path);
        }
    }
}
