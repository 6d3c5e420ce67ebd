//! Image data types shared by readers, writers and the pipeline

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::layout::DatatypeTag;

/// Source image as produced by a reader
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    /// Per-axis extents, `extents[0]` is the channel count
    pub extents: Vec<usize>,
    /// Element kind declared by the source
    pub datatype: DatatypeTag,
    /// Channel-interleaved elements, little-endian
    pub data: Vec<u8>,
}

impl ImageDescriptor {
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Product of all extents, `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.extents
            .iter()
            .try_fold(1usize, |acc, &extent| acc.checked_mul(extent))
    }

    /// Checks that the buffer holds exactly one `element_size` slot per element.
    pub fn validate(&self, element_size: usize) -> Result<()> {
        let expected = self
            .element_count()
            .and_then(|count| count.checked_mul(element_size))
            .ok_or_else(|| {
                ConversionError::ShapeMismatchError(format!(
                    "byte size of extents {:?} overflows",
                    self.extents
                ))
            })?;

        if self.data.len() != expected {
            return Err(ConversionError::ShapeMismatchError(format!(
                "buffer holds {} bytes but extents {:?} of {}-byte elements need {}",
                self.data.len(),
                self.extents,
                element_size,
                expected
            )));
        }
        Ok(())
    }
}
