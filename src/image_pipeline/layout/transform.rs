use tracing::trace;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Reorders channel-interleaved elements into channel-planar storage.
///
/// `source` holds `S` pixels of `channel_count` elements each, channel
/// varying fastest. The result holds `channel_count` planes of `S` elements
/// each: element `s * C + c` of the source lands at `c * S + s`.
///
/// Works on raw bytes; `element_size` is the only datatype knowledge needed.
/// Calling it again on the output with `channel_count = S` restores the
/// original order.
pub fn deinterleave(source: &[u8], element_size: usize, channel_count: usize) -> Result<Vec<u8>> {
    if element_size == 0 {
        return Err(ConversionError::ShapeMismatchError(
            "element size must be at least one byte".to_string(),
        ));
    }
    if channel_count == 0 {
        return Err(ConversionError::ShapeMismatchError(
            "channel count must be at least one".to_string(),
        ));
    }
    if source.len() % element_size != 0 {
        return Err(ConversionError::ShapeMismatchError(format!(
            "buffer of {} bytes is not a whole number of {}-byte elements",
            source.len(),
            element_size
        )));
    }

    let element_count = source.len() / element_size;
    if element_count % channel_count != 0 {
        return Err(ConversionError::ShapeMismatchError(format!(
            "{} channels do not evenly divide {} elements",
            channel_count, element_count
        )));
    }
    let spatial_count = element_count / channel_count;

    trace!(
        element_size,
        channel_count,
        spatial_count,
        "Deinterleaving buffer"
    );

    if channel_count == 1 || spatial_count <= 1 {
        return Ok(source.to_vec());
    }

    let pixel_stride = channel_count * element_size;
    let plane_len = spatial_count * element_size;
    let mut planar = vec![0u8; source.len()];

    for (channel, plane) in planar.chunks_exact_mut(plane_len).enumerate() {
        let channel_offset = channel * element_size;
        for (dst, pixel) in plane
            .chunks_exact_mut(element_size)
            .zip(source.chunks_exact(pixel_stride))
        {
            dst.copy_from_slice(&pixel[channel_offset..channel_offset + element_size]);
        }
    }

    Ok(planar)
}
