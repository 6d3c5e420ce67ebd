use crate::image_pipeline::common::error::{ConversionError, Result};

/// Destination axis ordering derived from channel-first source extents.
///
/// The source stores the channel index fastest, which a channel-last
/// destination expresses by listing the channel axis last. The plan is the
/// source extents rotated left by one: `[c, x, y]` becomes `[x, y, c]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisPlan {
    extents: Vec<usize>,
    channel_count: usize,
    spatial_count: usize,
}

impl AxisPlan {
    /// Rotates `extents` so the leading channel axis ends up last.
    ///
    /// Rank 1 (a lone channel axis) is accepted and maps onto itself.
    pub fn from_source_extents(extents: &[usize]) -> Result<Self> {
        let Some((&channel_count, spatial)) = extents.split_first() else {
            return Err(ConversionError::ShapeMismatchError(
                "image declares no axes".to_string(),
            ));
        };

        if let Some(axis) = extents.iter().position(|&extent| extent == 0) {
            return Err(ConversionError::ShapeMismatchError(format!(
                "axis {} has zero extent",
                axis
            )));
        }

        let spatial_count = spatial.iter().try_fold(1usize, |acc, &extent| acc.checked_mul(extent));
        let spatial_count = spatial_count
            .filter(|count| count.checked_mul(channel_count).is_some())
            .ok_or_else(|| {
                ConversionError::ShapeMismatchError(format!(
                    "element count of extents {:?} overflows",
                    extents
                ))
            })?;

        let mut rotated = extents.to_vec();
        rotated.rotate_left(1);

        Ok(Self {
            extents: rotated,
            channel_count,
            spatial_count,
        })
    }

    /// Destination extents, fastest-varying axis first.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Number of elements per channel.
    pub fn spatial_count(&self) -> usize {
        self.spatial_count
    }

    pub fn element_count(&self) -> usize {
        self.channel_count * self.spatial_count
    }
}
