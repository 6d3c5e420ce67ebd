//! Conversion configuration types

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Destination container formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single-HDU FITS image (default)
    #[default]
    Fits,
    /// Multi-page 16-bit grayscale TIFF, one page per channel
    Tiff,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Fits => "fits",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// Destination used when none is given: the input path with the
    /// format's extension appended (`cells.ics` becomes `cells.ics.fits`).
    pub fn default_output_path(self, input: &Path) -> PathBuf {
        let mut name = OsString::from(input.as_os_str());
        name.push(".");
        name.push(self.extension());
        PathBuf::from(name)
    }
}

/// Configuration for a conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Replace an existing destination file instead of failing
    pub overwrite: bool,
    /// Check the reader's data size against the declared layout before reading
    pub validate_layout: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            overwrite: true,
            validate_layout: true,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    overwrite: Option<bool>,
    validate_layout: Option<bool>,
}

impl ConversionConfigBuilder {
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    pub fn validate_layout(mut self, validate: bool) -> Self {
        self.validate_layout = Some(validate);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            overwrite: self.overwrite.unwrap_or(default.overwrite),
            validate_layout: self.validate_layout.unwrap_or(default.validate_layout),
        }
    }
}
