use thiserror::Error;

use crate::image_pipeline::layout::DatatypeTag;

/// Status reported when the destination container cannot be created.
pub const FILE_NOT_CREATED: u8 = 105;
/// Status reported when writing image data to the destination fails.
pub const WRITE_ERROR: u8 = 106;
/// Status for every other fatal condition.
pub const FATAL: u8 = 255;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Could not open file {0}")]
    SourceOpenError(String),

    #[error("Could not read data: {0}")]
    SourceReadError(String),

    #[error("Unsupported datatype {0}, cannot continue")]
    UnsupportedTypeError(DatatypeTag),

    #[error("Image shape mismatch: {0}")]
    ShapeMismatchError(String),

    #[error("Could not create file for writing: {0}")]
    DestinationCreateError(String),

    #[error("Could not write image: {0}")]
    DestinationWriteError(String),

    #[error("Could not close source: {0}")]
    CloseWarning(String),
}

impl ConversionError {
    /// Everything but a close warning aborts the conversion.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ConversionError::CloseWarning(_))
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConversionError::DestinationCreateError(_) => FILE_NOT_CREATED,
            ConversionError::DestinationWriteError(_) => WRITE_ERROR,
            ConversionError::CloseWarning(_) => 0,
            _ => FATAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
