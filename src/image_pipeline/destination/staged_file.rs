use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Output file written next to its destination and renamed into place on commit.
///
/// Dropping an uncommitted `StagedFile` deletes it, so a failed conversion
/// never leaves a file at the destination path.
#[derive(Debug)]
pub struct StagedFile {
    target: PathBuf,
    temp: NamedTempFile,
}

impl StagedFile {
    pub fn create(target: &Path) -> Result<Self> {
        if target.is_dir() {
            return Err(ConversionError::DestinationCreateError(format!(
                "'{}' is a directory",
                target.display()
            )));
        }

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let temp = Builder::new()
            .prefix(".ics2fits-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| {
                ConversionError::DestinationCreateError(format!("'{}': {}", target.display(), e))
            })?;

        debug!(staging = %temp.path().display(), target = %target.display(), "Staging output");

        Ok(Self {
            target: target.to_path_buf(),
            temp,
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn file_mut(&mut self) -> &mut File {
        self.temp.as_file_mut()
    }

    /// Flushes the staged data to disk and moves it to the target path.
    ///
    /// Without `overwrite` the rename refuses to replace an existing target
    /// and the staged file is discarded.
    pub fn commit(self, overwrite: bool) -> Result<()> {
        let write_error = |e: std::io::Error| {
            ConversionError::DestinationWriteError(format!("'{}': {}", self.target.display(), e))
        };

        self.temp.as_file().sync_all().map_err(write_error)?;
        let persisted = if overwrite {
            self.temp.persist(&self.target)
        } else {
            self.temp.persist_noclobber(&self.target)
        };
        persisted.map_err(|e| match e.error.kind() {
            ErrorKind::AlreadyExists => ConversionError::DestinationCreateError(format!(
                "'{}' already exists",
                self.target.display()
            )),
            _ => write_error(e.error),
        })?;

        debug!(target = %self.target.display(), "Output committed");
        Ok(())
    }
}
