use std::path::Path;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::layout::DatatypeTag;

/// Declared shape and element kind of an opened source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub extents: Vec<usize>,
    pub datatype: DatatypeTag,
}

/// Opens source containers.
pub trait SourceReader {
    type Handle: SourceHandle;

    fn open(&self, path: &Path) -> Result<Self::Handle>;
}

/// An opened source container.
pub trait SourceHandle {
    fn layout(&self) -> SourceLayout;

    /// Size in bytes of the element data `read_data` expects to fill.
    fn data_size(&self) -> usize;

    /// Fills `buffer` with channel-interleaved, little-endian elements.
    fn read_data(&mut self, buffer: &mut [u8]) -> Result<()>;

    /// Releases the source. Errors here are reported as `CloseWarning`.
    fn close(self) -> Result<()>;
}
