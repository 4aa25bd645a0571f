//! Crop by drawing an already decoded image through a transform.

use log::debug;

use super::{allocate_image, CropError};
use crate::decode::DecodedImage;
use crate::options::CropOptions;
use crate::transform::{draw_transformed, Matrix, Rect, RectF, RotatedImage, ScaleToFit};

/// Crop the display-space `rect` out of a fully decoded image.
///
/// The image's pending rotation is applied first, then `rect` is moved to
/// the origin. The result is drawn into a new `out_width x out_height`
/// buffer, clipped to its bounds.
///
/// # Errors
///
/// - [`CropError::OutOfMemory`] if the output buffer cannot be allocated or
///   exceeds `options.max_decoded_pixels`.
/// - [`CropError::Decode`] if the image's pixel buffer does not match its
///   dimensions.
pub fn crop_in_memory(
    image: &RotatedImage,
    rect: Rect,
    out_width: u32,
    out_height: u32,
    options: &CropOptions,
) -> Result<DecodedImage, CropError> {
    image.image().check_buffer()?;

    // The caller holds the full decode; the output is the only new allocation
    let mut cropped = allocate_image(out_width, out_height, options)?;

    let dst = RectF::new(0.0, 0.0, rect.width() as f64, rect.height() as f64);
    let mut matrix = Matrix::rect_to_rect(RectF::from(rect), dst, ScaleToFit::Fill);
    matrix.pre_concat(&image.rotate_matrix());

    debug!(
        "in-memory crop of {} from {}x{} (rotation {}) into {}x{}",
        rect,
        image.image().width,
        image.image().height,
        image.rotation(),
        out_width,
        out_height
    );
    draw_transformed(image.image(), &mut cropped, &matrix, options.filter);

    Ok(cropped)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
