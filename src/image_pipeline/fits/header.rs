//! FITS primary header cards

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::layout::SampleFormat;

/// FITS files are made of 2880-byte blocks.
pub const BLOCK_SIZE: usize = 2880;
pub const CARD_SIZE: usize = 80;
pub const MAX_AXES: usize = 999;

/// On-disk encoding of a sample format: BITPIX and the optional BZERO offset.
pub fn encoding_for(format: SampleFormat) -> (i32, Option<i64>) {
    match format {
        SampleFormat::Unsigned16 => (16, Some(32768)),
    }
}

/// Bytes of zero (data) or space (header) padding to reach a block boundary.
pub fn padding_for(len: usize) -> usize {
    (BLOCK_SIZE - len % BLOCK_SIZE) % BLOCK_SIZE
}

fn card(keyword: &str, value: &str, comment: &str) -> String {
    let mut card = format!("{:<8}= {:>20}", keyword, value);
    if !comment.is_empty() {
        card.push_str(" / ");
        card.push_str(comment);
    }
    card.truncate(CARD_SIZE);
    format!("{:<width$}", card, width = CARD_SIZE)
}

/// Serializes a primary header for an image of `naxes` (NAXIS1 first),
/// padded to a whole number of blocks.
pub fn primary_header(naxes: &[usize], format: SampleFormat) -> Result<Vec<u8>> {
    if naxes.is_empty() || naxes.len() > MAX_AXES {
        return Err(ConversionError::DestinationCreateError(format!(
            "FITS images need between 1 and {} axes, got {}",
            MAX_AXES,
            naxes.len()
        )));
    }

    let (bitpix, bzero) = encoding_for(format);

    let mut cards = vec![
        card("SIMPLE", "T", "file does conform to FITS standard"),
        card("BITPIX", &bitpix.to_string(), "number of bits per data pixel"),
        card("NAXIS", &naxes.len().to_string(), "number of data axes"),
    ];
    for (i, extent) in naxes.iter().enumerate() {
        cards.push(card(
            &format!("NAXIS{}", i + 1),
            &extent.to_string(),
            &format!("length of data axis {}", i + 1),
        ));
    }
    cards.push(card("EXTEND", "T", "FITS dataset may contain extensions"));
    if let Some(bzero) = bzero {
        cards.push(card(
            "BZERO",
            &bzero.to_string(),
            "offset data range to that of unsigned short",
        ));
        cards.push(card("BSCALE", "1", "default scaling factor"));
    }
    cards.push(format!("{:<width$}", "END", width = CARD_SIZE));

    let mut bytes = cards.concat().into_bytes();
    bytes.resize(bytes.len() + padding_for(bytes.len()), b' ');
    Ok(bytes)
}
