//! Destination writing module
//!
//! Writer traits shared by every output format, and the staged output file
//! they write through.

mod staged_file;
mod writer;

pub use staged_file::StagedFile;
pub use writer::{DestinationImage, DestinationWriter};
