//! Shared pieces of the conversion pipeline
//!
//! Holds the error taxonomy every reader, writer and pipeline step reports through.

pub mod error;

pub use error::{ConversionError, Result};
