//! TIFF writing module
//!
//! Alternative destination that stores each channel plane as one
//! uncompressed 16-bit grayscale page of a multi-page TIFF.

mod standard_tiff_writer;


pub use standard_tiff_writer::{StandardTiffWriter, TiffImage};
