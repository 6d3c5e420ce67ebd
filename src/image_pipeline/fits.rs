//! FITS writing module
//!
//! Uncompressed single-HDU FITS output with the channel axis last.

mod fits_writer;
pub mod header;


pub use fits_writer::{FitsImage, FitsWriter};
