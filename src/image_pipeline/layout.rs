//! Layout transformation engine
//!
//! Datatype dispatch, channel-last axis planning and the interleaved to
//! planar reordering. Nothing here touches the filesystem.

mod axis_plan;
mod datatype;
mod transform;
pub mod types;

#[cfg(test)]
mod tests;

pub use axis_plan::AxisPlan;
pub use datatype::{DatatypeRegistry, DatatypeTag, ElementKind, SampleFormat};
pub use transform::deinterleave;
pub use types::ImageDescriptor;
