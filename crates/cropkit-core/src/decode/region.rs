//! Integer downsampling for region decodes.
//!
//! A sample size of `n` produces an image of `ceil(w / n) x ceil(h / n)`
//! pixels. Each output pixel is the area average of the source pixels it
//! covers, computed by `image::imageops::thumbnail`.

use image::{GenericImageView, Rgb};

use super::DecodedImage;

/// Downsample an RGB view by an integer factor.
///
/// A `sample_size` of 0 or 1 keeps the full resolution.
pub fn downsample<I>(image: &I, sample_size: u32) -> DecodedImage
where
    I: GenericImageView<Pixel = Rgb<u8>>,
{
    let (width, height) = image.dimensions();
    let n = sample_size.max(1);
    let scaled = image::imageops::thumbnail(image, width.div_ceil(n), height.div_ceil(n));
    DecodedImage::from_rgb_image(scaled)
}
