use std::path::Path;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::layout::ElementKind;

/// Creates destination containers.
pub trait DestinationWriter {
    type Image: DestinationImage;

    /// Creates an image with the given extents, fastest-varying axis first.
    fn create_image(&self, path: &Path, extents: &[usize], kind: ElementKind) -> Result<Self::Image>;
}

/// A destination image being written.
///
/// Nothing becomes visible at the destination path until `finalize`
/// succeeds; dropping the image earlier discards it.
pub trait DestinationImage {
    /// Writes the planar, little-endian element buffer.
    fn write_image(&mut self, data: &[u8], element_count: usize) -> Result<()>;

    /// Moves the image to its destination path, replacing any file there.
    fn finalize(self) -> Result<()>;

    /// Like `finalize`, but fails with `DestinationCreateError` and keeps the
    /// existing file if something already occupies the destination path.
    fn finalize_no_clobber(self) -> Result<()>;
}
