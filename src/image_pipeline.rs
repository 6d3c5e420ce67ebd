//! Image conversion pipeline module
//!
//! This module converts channel-interleaved ICS images into channel-last,
//! channel-planar FITS (or TIFF) images, with separate modules for source
//! reading, layout transformation, destination writing and orchestration.

pub mod common;
pub mod conversions;
pub mod destination;
pub mod fits;
pub mod ics;
pub mod layout;
pub mod tiff;

pub use common::{
    ConversionError,
    Result,
};

pub use layout::{
    AxisPlan,
    DatatypeRegistry,
    DatatypeTag,
    ElementKind,
    ImageDescriptor,
    SampleFormat,
    deinterleave,
};

pub use ics::{
    IcsReader,
    SourceHandle,
    SourceLayout,
    SourceReader,
};

pub use destination::{
    DestinationImage,
    DestinationWriter,
};

pub use fits::FitsWriter;

// `self::` keeps this apart from the `tiff` crate
pub use self::tiff::StandardTiffWriter;

pub use conversions::{
    ConversionConfig,
    ConversionConfigBuilder,
    ConversionPipeline,
    OutputFormat,
    PipelineTimings,
};
