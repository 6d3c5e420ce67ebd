//! Source reader for ICS (Image Cytometry Standard) containers.
//!
//! Supports version 1 (`.ics` header with a sibling `.ids` data file) and
//! version 2 (header and data in a single `.ics` file) with uncompressed
//! element data.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::ics::header::{IcsHeader, IcsVersion};
use crate::image_pipeline::ics::reader::{SourceHandle, SourceLayout, SourceReader};

const HEADER_EXTENSION: &str = "ics";
const DATA_EXTENSION: &str = "ids";

pub struct IcsReader;

/// An opened ICS container
#[derive(Debug)]
pub struct IcsHandle {
    header: IcsHeader,
    data_path: PathBuf,
    data_offset: u64,
}

impl IcsHandle {
    pub fn header(&self) -> &IcsHeader {
        &self.header
    }
}

impl SourceReader for IcsReader {
    type Handle = IcsHandle;

    /// Parses the header of the container at `path`.
    ///
    /// A path to the `.ids` half of a version 1 pair opens the matching
    /// `.ics` header. The data file is only touched by
    /// [`SourceHandle::read_data`].
    fn open(&self, path: &Path) -> Result<IcsHandle> {
        let header_path = header_path_for(path);
        debug!(path = %header_path.display(), "Opening ICS header");

        let file = File::open(&header_path).map_err(|e| {
            ConversionError::SourceOpenError(format!("'{}': {}", header_path.display(), e))
        })?;
        let header = IcsHeader::parse(&mut BufReader::new(file)).map_err(|e| {
            ConversionError::SourceOpenError(format!("'{}': {}", header_path.display(), e))
        })?;

        let (data_path, data_offset) = match (&header.source, header.version) {
            (Some((source, offset)), _) => {
                let source = match header_path.parent() {
                    Some(dir) if source.is_relative() => dir.join(source),
                    _ => source.clone(),
                };
                (source, *offset)
            }
            (None, IcsVersion::V1) => (header_path.with_extension(DATA_EXTENSION), 0),
            (None, IcsVersion::V2) => (header_path.clone(), header.header_len),
        };

        debug!(
            version = ?header.version,
            extents = ?header.extents,
            order = ?header.order,
            datatype = %header.datatype,
            data = %data_path.display(),
            data_offset,
            "Parsed ICS header"
        );

        Ok(IcsHandle {
            header,
            data_path,
            data_offset,
        })
    }
}

impl SourceHandle for IcsHandle {
    fn layout(&self) -> SourceLayout {
        SourceLayout {
            extents: self.header.extents.clone(),
            datatype: self.header.datatype.clone(),
        }
    }

    fn data_size(&self) -> usize {
        self.header.data_size().unwrap_or(usize::MAX)
    }

    fn read_data(&mut self, buffer: &mut [u8]) -> Result<()> {
        if self.header.compression != "uncompressed" {
            return Err(ConversionError::SourceReadError(format!(
                "{} compressed data is not supported",
                self.header.compression
            )));
        }

        let expected = self.header.data_size().ok_or_else(|| {
            ConversionError::SourceReadError("declared data size overflows".to_string())
        })?;
        if buffer.len() != expected {
            return Err(ConversionError::SourceReadError(format!(
                "buffer of {} bytes given for {} bytes of data",
                buffer.len(),
                expected
            )));
        }

        let read_error = |e: std::io::Error| {
            let reason = if e.kind() == ErrorKind::UnexpectedEof {
                "file is shorter than its declared layout".to_string()
            } else {
                e.to_string()
            };
            ConversionError::SourceReadError(format!("'{}': {}", self.data_path.display(), reason))
        };

        let mut file = File::open(&self.data_path).map_err(read_error)?;
        file.seek(SeekFrom::Start(self.data_offset))
            .map_err(read_error)?;
        file.read_exact(buffer).map_err(read_error)?;

        to_little_endian(buffer, &self.header.byte_order)?;

        debug!(bytes = buffer.len(), "Read ICS element data");
        Ok(())
    }

    fn close(self) -> Result<()> {
        debug!(path = %self.data_path.display(), "Closing ICS source");
        Ok(())
    }
}

fn header_path_for(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(DATA_EXTENSION) => path.with_extension(HEADER_EXTENSION),
        _ => path.to_path_buf(),
    }
}

/// Rearranges each element so its least significant byte comes first.
///
/// `byte_order[i]` is the 1-based significance of the i-th stored byte, and
/// its length is the element width checked by the header parser.
fn to_little_endian(buffer: &mut [u8], byte_order: &[usize]) -> Result<()> {
    let width = byte_order.len();
    let already_le = byte_order
        .iter()
        .enumerate()
        .all(|(i, &significance)| significance == i + 1);
    if width < 2 || already_le {
        return Ok(());
    }
    if buffer.len() % width != 0 {
        return Err(ConversionError::SourceReadError(format!(
            "{} bytes of data do not split into {}-byte elements",
            buffer.len(),
            width
        )));
    }

    let mut scratch = vec![0u8; width];
    for element in buffer.chunks_exact_mut(width) {
        for (stored, &significance) in element.iter().zip(byte_order) {
            scratch[significance - 1] = *stored;
        }
        element.copy_from_slice(&scratch);
    }
    Ok(())
}

