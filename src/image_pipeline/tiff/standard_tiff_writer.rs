use std::path::Path;

use tiff::encoder::{Compression, TiffEncoder, colortype::Gray16};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::destination::{DestinationImage, DestinationWriter, StagedFile};
use crate::image_pipeline::layout::{ElementKind, SampleFormat};

/// Writes planar images as uncompressed multi-page TIFFs, one page per channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTiffWriter;

#[derive(Debug)]
pub struct TiffImage {
    staged: StagedFile,
    kind: ElementKind,
    width: u32,
    height: u32,
    pages: usize,
    written: bool,
}

impl DestinationWriter for StandardTiffWriter {
    type Image = TiffImage;

    fn create_image(&self, path: &Path, extents: &[usize], kind: ElementKind) -> Result<TiffImage> {
        let (width, height, pages) = page_geometry(extents)?;
        let staged = StagedFile::create(path)?;

        debug!(width, height, pages, "Created TIFF image");

        Ok(TiffImage {
            staged,
            kind,
            width,
            height,
            pages,
            written: false,
        })
    }
}

/// Splits channel-last extents into page width, page height and page count.
fn page_geometry(extents: &[usize]) -> Result<(u32, u32, usize)> {
    let Some((&pages, spatial)) = extents.split_last() else {
        return Err(ConversionError::DestinationCreateError(
            "image declares no axes".to_string(),
        ));
    };
    if extents.contains(&0) {
        return Err(ConversionError::DestinationCreateError(format!(
            "extents {:?} contain an empty axis",
            extents
        )));
    }

    let (width, rows) = match spatial.split_first() {
        Some((&width, rest)) => (width, rest.iter().try_fold(1usize, |acc, &e| acc.checked_mul(e))),
        None => (1, Some(1)),
    };

    let too_large = || {
        ConversionError::DestinationCreateError(format!(
            "extents {:?} exceed TIFF page limits",
            extents
        ))
    };
    let width = u32::try_from(width).map_err(|_| too_large())?;
    let height = rows
        .and_then(|rows| u32::try_from(rows).ok())
        .ok_or_else(too_large)?;

    Ok((width, height, pages))
}

impl TiffImage {
    fn commit(self, overwrite: bool) -> Result<()> {
        if !self.written {
            return Err(ConversionError::DestinationWriteError(
                "no image data was written".to_string(),
            ));
        }
        self.staged.commit(overwrite)
    }
}

impl DestinationImage for TiffImage {
    fn write_image(&mut self, data: &[u8], element_count: usize) -> Result<()> {
        if self.written {
            return Err(ConversionError::DestinationWriteError(
                "image data was already written".to_string(),
            ));
        }

        let page_len = self.width as usize * self.height as usize;
        let expected = page_len * self.pages;
        if element_count != expected || data.len() != element_count * self.kind.size {
            return Err(ConversionError::DestinationWriteError(format!(
                "image holds {} elements, got {} ({} bytes)",
                expected,
                element_count,
                data.len()
            )));
        }

        let samples: Vec<u16> = match self.kind.format {
            SampleFormat::Unsigned16 => data
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect(),
        };

        let encode_error = |e: tiff::TiffError| ConversionError::DestinationWriteError(e.to_string());

        let mut encoder = TiffEncoder::new(self.staged.file_mut())
            .map_err(encode_error)?
            .with_compression(Compression::Uncompressed);

        for (page, plane) in samples.chunks_exact(page_len).enumerate() {
            encoder
                .write_image::<Gray16>(self.width, self.height, plane)
                .map_err(encode_error)?;
            debug!(page, "Wrote TIFF page");
        }

        self.written = true;
        Ok(())
    }

    fn finalize(self) -> Result<()> {
        self.commit(true)
    }

    fn finalize_no_clobber(self) -> Result<()> {
        self.commit(false)
    }
}
