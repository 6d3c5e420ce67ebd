//! Pipeline conversions module
//!
//! Orchestration of a single source to destination conversion.

mod ics_to_fits;
mod timing;
pub mod types;


pub use ics_to_fits::ConversionPipeline;
pub use timing::{PipelineTimings, StepTiming};
pub use types::{ConversionConfig, ConversionConfigBuilder, OutputFormat};
