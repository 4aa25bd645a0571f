//! Crop by decoding only the needed region of the source.

use log::debug;

use super::{transform_image, CropError};
use crate::decode::{DecodeError, DecodedImage, ImageSource};
use crate::options::CropOptions;
use crate::transform::{calculate_sample_size, map_rect_to_raw_space, swaps_dimensions, Matrix, Rect};

/// Crop the display-space `rect` out of `source` by region decoding.
///
/// # Algorithm
///
/// 1. Open a region decoder and read the raw image size.
/// 2. Map `rect` into raw space using `exif_rotation`.
/// 3. Pick a sample size against `options.oversample_factor` times the
///    output size, so the decode keeps some resolution above the target.
/// 4. Decode exactly the raw rectangle at that sample size.
/// 5. If the decode is larger than the target, scale it down; if the image is
///    rotated, rotate it forward again. Both go into one transform and one
///    render.
///
/// `out_width`/`out_height` are display-space sizes. For quarter-turn
/// rotations the raw-oriented target is `out_height x out_width`.
///
/// # Errors
///
/// - [`CropError::InvalidRegion`] if the mapped rectangle is outside the
///   image or the decoder fails on it. Carries the rectangle, image size and
///   rotation, with the decoder error as its source.
/// - [`CropError::OutOfMemory`] if the decoder or a buffer allocation runs out
///   of memory.
/// - [`CropError::Decode`] if the source cannot be opened.
pub fn crop_region<S: ImageSource + ?Sized>(
    source: &S,
    exif_rotation: i32,
    rect: Rect,
    out_width: u32,
    out_height: u32,
    options: &CropOptions,
) -> Result<DecodedImage, CropError> {
    options.validate()?;

    let mut decoder = source.open_region_decoder(options.max_decoded_pixels)?;
    let (width, height) = decoder.dimensions();

    let raw_rect = map_rect_to_raw_space(rect, exif_rotation, width, height);

    let invalid_region = |source: DecodeError| CropError::InvalidRegion {
        rect: raw_rect,
        image_width: width,
        image_height: height,
        rotation: exif_rotation,
        source,
    };

    if !raw_rect.is_within(width, height) {
        debug!(
            "region crop {} -> raw {} outside {}x{} (rotation {})",
            rect, raw_rect, width, height, exif_rotation
        );
        return Err(invalid_region(DecodeError::RegionOutOfBounds));
    }

    let (target_width, target_height) = if swaps_dimensions(exif_rotation) {
        (out_height, out_width)
    } else {
        (out_width, out_height)
    };

    // Within bounds, so both extents are non-negative
    let (raw_width, raw_height) = (raw_rect.width() as u32, raw_rect.height() as u32);
    let factor = options.oversample_factor;
    let sample_size = calculate_sample_size(
        raw_width,
        raw_height,
        target_width.saturating_mul(factor),
        target_height.saturating_mul(factor),
    );
    debug!(
        "region crop {} -> raw {} in {}x{} (rotation {}), sample size {}",
        rect, raw_rect, width, height, exif_rotation, sample_size
    );

    let decoded = match decoder.decode_region(raw_rect, sample_size) {
        Ok(Some(decoded)) if !decoded.is_empty() => decoded,
        Ok(_) => return Err(invalid_region(DecodeError::EmptyRegion)),
        Err(DecodeError::OutOfMemory) => {
            return Err(CropError::OutOfMemory {
                width: raw_width,
                height: raw_height,
            })
        }
        Err(e) => return Err(invalid_region(e)),
    };
    // Release the decoder before rendering the result
    drop(decoder);

    let mut post = Matrix::identity();
    let mut needs_post_transform = false;
    if decoded.width > target_width || decoded.height > target_height {
        needs_post_transform = true;
        post.post_scale(
            target_width as f64 / decoded.width as f64,
            target_height as f64 / decoded.height as f64,
        );
    }
    if exif_rotation != 0 {
        needs_post_transform = true;
        post.post_rotate(exif_rotation as f64);
    }

    if !needs_post_transform {
        return Ok(decoded);
    }

    debug!(
        "post-decode transform of {}x{} decode to {}x{} target",
        decoded.width, decoded.height, target_width, target_height
    );
    transform_image(&decoded, &post, options)
}
