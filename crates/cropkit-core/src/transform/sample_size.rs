//! Decode sample-size selection.
//!
//! Decoders downsample by power-of-two factors only. The chosen factor is the
//! smallest power of two that brings the image within the requested bounds.

use crate::crop::CropError;
use crate::decode::ImageSource;

/// Pick a power-of-two downsample factor so that decoding a
/// `image_width x image_height` image at 1/N resolution fits within
/// `max_width x max_height`.
///
/// Returns 1 when the image already fits. Zero bounds are treated as 1.
///
/// # Example
///
/// ```
/// use cropkit_core::transform::calculate_sample_size;
///
/// // ceil(1000 / 300) = 4, ceil(500 / 300) = 2 -> 4
/// assert_eq!(calculate_sample_size(1000, 500, 300, 300), 4);
/// // ceil(300 / 100) = 3 -> rounded up to 4
/// assert_eq!(calculate_sample_size(300, 300, 100, 100), 4);
/// ```
pub fn calculate_sample_size(
    image_width: u32,
    image_height: u32,
    max_width: u32,
    max_height: u32,
) -> u32 {
    let max_width = max_width.max(1);
    let max_height = max_height.max(1);

    if image_width <= max_width && image_height <= max_height {
        return 1;
    }

    let ss_width = image_width.div_ceil(max_width);
    let ss_height = image_height.div_ceil(max_height);
    let sample_size = ss_width.max(ss_height);

    // Round up, never down, so the bound still holds after quantizing
    sample_size
        .checked_next_power_of_two()
        .unwrap_or(1 << (u32::BITS - 1))
}

/// Read a source's bounds and pick a sample size that fits it within a
/// `max_size x max_size` square.
pub fn calculate_source_sample_size<S: ImageSource + ?Sized>(
    source: &S,
    max_size: u32,
) -> Result<u32, CropError> {
    let (width, height) = source.read_dimensions()?;
    Ok(calculate_sample_size(width, height, max_size, max_size))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
