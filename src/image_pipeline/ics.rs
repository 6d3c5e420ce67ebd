//! ICS reading module
//!
//! The source side of the conversion: the reader traits the pipeline
//! depends on, and their implementation for ICS containers.

pub mod header;
mod ics_reader;
mod reader;


pub use header::{HeaderError, IcsHeader, IcsVersion};
pub use ics_reader::{IcsHandle, IcsReader};
pub use reader::{SourceHandle, SourceLayout, SourceReader};
