use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::destination::{DestinationImage, DestinationWriter, StagedFile};
use crate::image_pipeline::fits::header::{encoding_for, padding_for, primary_header};
use crate::image_pipeline::layout::{ElementKind, SampleFormat};

/// Writes single-HDU FITS images.
pub struct FitsWriter;

/// A FITS image whose header has been staged and which awaits its data.
#[derive(Debug)]
pub struct FitsImage {
    staged: StagedFile,
    kind: ElementKind,
    element_count: usize,
    written: bool,
}

impl DestinationWriter for FitsWriter {
    type Image = FitsImage;

    fn create_image(&self, path: &Path, extents: &[usize], kind: ElementKind) -> Result<FitsImage> {
        let header = primary_header(extents, kind.format)?;
        let element_count = extents
            .iter()
            .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
            .ok_or_else(|| {
                ConversionError::DestinationCreateError(format!("extents {:?} overflow", extents))
            })?;

        let mut staged = StagedFile::create(path)?;
        staged.file_mut().write_all(&header).map_err(|e| {
            ConversionError::DestinationCreateError(format!("'{}': {}", path.display(), e))
        })?;

        let (bitpix, bzero) = encoding_for(kind.format);
        debug!(naxes = ?extents, bitpix, bzero = ?bzero, "Created FITS image");

        Ok(FitsImage {
            staged,
            kind,
            element_count,
            written: false,
        })
    }
}

impl FitsImage {
    fn commit(self, overwrite: bool) -> Result<()> {
        if !self.written {
            return Err(ConversionError::DestinationWriteError(
                "no image data was written".to_string(),
            ));
        }
        self.staged.commit(overwrite)
    }
}

impl DestinationImage for FitsImage {
    fn write_image(&mut self, data: &[u8], element_count: usize) -> Result<()> {
        if self.written {
            return Err(ConversionError::DestinationWriteError(
                "image data was already written".to_string(),
            ));
        }
        if element_count != self.element_count || data.len() != element_count * self.kind.size {
            return Err(ConversionError::DestinationWriteError(format!(
                "image holds {} elements, got {} ({} bytes)",
                self.element_count,
                element_count,
                data.len()
            )));
        }

        let target = self.staged.target().display().to_string();
        let write_error =
            |e: std::io::Error| ConversionError::DestinationWriteError(format!("'{}': {}", target, e));

        let mut out = BufWriter::new(self.staged.file_mut());
        match self.kind.format {
            // BZERO = 32768: stored value is the unsigned value shifted into i16 range
            SampleFormat::Unsigned16 => {
                for element in data.chunks_exact(2) {
                    let value = u16::from_le_bytes([element[0], element[1]]);
                    out.write_i16::<BigEndian>((value ^ 0x8000) as i16)
                        .map_err(write_error)?;
                }
            }
        }
        let (bitpix, _) = encoding_for(self.kind.format);
        let stored_len = element_count * (bitpix.unsigned_abs() as usize / 8);
        out.write_all(&vec![0u8; padding_for(stored_len)])
            .map_err(write_error)?;
        out.flush().map_err(write_error)?;

        self.written = true;
        debug!(elements = element_count, "Wrote FITS image data");
        Ok(())
    }

    fn finalize(self) -> Result<()> {
        self.commit(true)
    }

    fn finalize_no_clobber(self) -> Result<()> {
        self.commit(false)
    }
}
