//! Crop strategies.
//!
//! Two ways of producing the cropped bitmap exist:
//! - **Region** ([`crop_region`]): decode only the needed raw-space region at a
//!   power-of-two sample size, then fix up scale and rotation. Preferred.
//! - **In-memory** ([`crop_in_memory`]): draw an already decoded image through
//!   a transform. Used when the source cannot decode regions, at the cost of
//!   holding the full image in memory.
//!
//! [`Cropper`] picks one once from the source's capabilities and exposes a
//! single `crop(rect, out_width, out_height)` entry point.

mod error;
mod in_memory;
mod region;

pub use error::CropError;
pub use in_memory::crop_in_memory;
pub use region::crop_region;

use log::{debug, warn};

use crate::decode::{DecodedImage, ImageSource};
use crate::options::CropOptions;
use crate::transform::{draw_transformed, Matrix, Rect, RectF, RotatedImage};

/// Which crop strategy a source supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropStrategy {
    /// Decode the full image and draw the crop out of it.
    InMemory,
    /// Decode only the crop region.
    Region,
}

impl CropStrategy {
    pub fn for_source<S: ImageSource + ?Sized>(source: &S) -> Self {
        if source.supports_region_decode() {
            CropStrategy::Region
        } else {
            CropStrategy::InMemory
        }
    }
}

enum Backend<'a, S: ImageSource + ?Sized> {
    InMemory(RotatedImage),
    Region { source: &'a S, exif_rotation: i32 },
}

/// Crops one source image, with the strategy resolved at construction.
pub struct Cropper<'a, S: ImageSource + ?Sized> {
    backend: Backend<'a, S>,
    options: CropOptions,
}

impl<'a, S: ImageSource + ?Sized> Cropper<'a, S> {
    /// Prepare to crop `source`, whose pixels must be rotated by
    /// `exif_rotation` degrees to display correctly.
    ///
    /// When the source cannot decode regions the full image is decoded here.
    pub fn new(source: &'a S, exif_rotation: i32, options: CropOptions) -> Result<Self, CropError> {
        options.validate()?;

        let backend = match CropStrategy::for_source(source) {
            CropStrategy::Region => Backend::Region {
                source,
                exif_rotation,
            },
            CropStrategy::InMemory => {
                warn!("region decoding unavailable, decoding the full image");
                let (width, height) = source.read_dimensions()?;
                check_allocation(width, height, &options)?;
                let image = source.decode_full()?;
                image.check_buffer()?;
                Backend::InMemory(RotatedImage::new(image, exif_rotation))
            }
        };

        Ok(Self { backend, options })
    }

    pub fn strategy(&self) -> CropStrategy {
        match self.backend {
            Backend::InMemory(_) => CropStrategy::InMemory,
            Backend::Region { .. } => CropStrategy::Region,
        }
    }

    pub fn options(&self) -> &CropOptions {
        &self.options
    }

    /// Crop the display-space `rect` to an `out_width x out_height` bitmap.
    pub fn crop(&self, rect: Rect, out_width: u32, out_height: u32) -> Result<DecodedImage, CropError> {
        match &self.backend {
            Backend::InMemory(image) => {
                crop_in_memory(image, rect, out_width, out_height, &self.options)
            }
            Backend::Region {
                source,
                exif_rotation,
            } => crop_region(
                *source,
                *exif_rotation,
                rect,
                out_width,
                out_height,
                &self.options,
            ),
        }
    }
}

fn check_allocation(width: u32, height: u32, options: &CropOptions) -> Result<(), CropError> {
    let pixels = width as u64 * height as u64;
    if pixels > options.max_decoded_pixels {
        warn!(
            "refusing {}x{} buffer, limit is {} pixels",
            width, height, options.max_decoded_pixels
        );
        return Err(CropError::OutOfMemory { width, height });
    }
    Ok(())
}

/// Allocate a black `width x height` RGB buffer without aborting on failure.
pub(crate) fn allocate_image(
    width: u32,
    height: u32,
    options: &CropOptions,
) -> Result<DecodedImage, CropError> {
    check_allocation(width, height, options)?;

    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or(CropError::OutOfMemory { width, height })?;

    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|_| CropError::OutOfMemory { width, height })?;
    pixels.resize(len, 0);

    debug!("allocated {}x{} buffer", width, height);
    Ok(DecodedImage::new(width, height, pixels))
}

/// Render `src` through `matrix` into a new buffer sized to the transformed
/// bounds, translated so those bounds start at the origin.
pub(crate) fn transform_image(
    src: &DecodedImage,
    matrix: &Matrix,
    options: &CropOptions,
) -> Result<DecodedImage, CropError> {
    let bounds = matrix.map_rect(RectF::new(0.0, 0.0, src.width as f64, src.height as f64));
    let width = bounds.width().round() as u32;
    let height = bounds.height().round() as u32;

    let mut output = allocate_image(width, height, options)?;

    let mut full = *matrix;
    full.post_translate(-bounds.left, -bounds.top);
    draw_transformed(src, &mut output, &full, options.filter);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DecodeError, MemorySource};
    use std::cell::Cell;
    use std::io::Cursor;

    fn png_source(width: u32, height: u32) -> MemorySource {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([x as u8, y as u8, 7])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        MemorySource::new(out.into_inner())
    }

    /// Wraps a source and hides its region decoder.
    struct NoRegionSource(MemorySource);

    impl ImageSource for NoRegionSource {
        fn read_dimensions(&self) -> Result<(u32, u32), DecodeError> {
            self.0.read_dimensions()
        }

        fn decode_full(&self) -> Result<DecodedImage, DecodeError> {
            self.0.decode_full()
        }

        fn supports_region_decode(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_strategy_for_source() {
        let source = png_source(4, 4);
        assert_eq!(CropStrategy::for_source(&source), CropStrategy::Region);
        assert_eq!(
            CropStrategy::for_source(&NoRegionSource(source)),
            CropStrategy::InMemory
        );
    }

    #[test]
    fn test_cropper_region_strategy() {
        let source = png_source(40, 20);
        let cropper = Cropper::new(&source, 0, CropOptions::default()).unwrap();
        assert_eq!(cropper.strategy(), CropStrategy::Region);

        let result = cropper.crop(Rect::new(10, 5, 20, 15), 10, 10).unwrap();
        assert_eq!((result.width, result.height), (10, 10));
        assert_eq!(result.pixel(0, 0), [10, 5, 7]);
    }

    #[test]
    fn test_cropper_in_memory_strategy() {
        let source = NoRegionSource(png_source(40, 20));
        let cropper = Cropper::new(&source, 0, CropOptions::default()).unwrap();
        assert_eq!(cropper.strategy(), CropStrategy::InMemory);

        let result = cropper.crop(Rect::new(10, 5, 20, 15), 10, 10).unwrap();
        assert_eq!((result.width, result.height), (10, 10));
        assert_eq!(result.pixel(0, 0), [10, 5, 7]);
    }

    #[test]
    fn test_strategies_agree_on_rotated_crop() {
        let source = png_source(40, 20);
        let fallback = NoRegionSource(source.clone());

        // Displayed 20x40; crop the displayed top half
        let rect = Rect::new(0, 0, 20, 20);
        let region = Cropper::new(&source, 90, CropOptions::default())
            .unwrap()
            .crop(rect, 20, 20)
            .unwrap();
        let in_memory = Cropper::new(&fallback, 90, CropOptions::default())
            .unwrap()
            .crop(rect, 20, 20)
            .unwrap();

        assert_eq!((region.width, region.height), (20, 20));
        assert_eq!(region, in_memory);
    }

    #[test]
    fn test_cropper_rejects_invalid_options() {
        let source = png_source(4, 4);
        let mut options = CropOptions::default();
        options.oversample_factor = 0;
        assert!(matches!(
            Cropper::new(&source, 0, options),
            Err(CropError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_in_memory_decode_respects_pixel_limit() {
        let source = NoRegionSource(png_source(40, 20));
        let mut options = CropOptions::default();
        options.max_decoded_pixels = 100;
        assert!(matches!(
            Cropper::new(&source, 0, options),
            Err(CropError::OutOfMemory {
                width: 40,
                height: 20
            })
        ));
    }

    #[test]
    fn test_pixel_limit_checked_before_full_decode() {
        struct CountingSource {
            decodes: Cell<u32>,
        }

        impl ImageSource for CountingSource {
            fn read_dimensions(&self) -> Result<(u32, u32), DecodeError> {
                Ok((4000, 3000))
            }

            fn decode_full(&self) -> Result<DecodedImage, DecodeError> {
                self.decodes.set(self.decodes.get() + 1);
                Err(DecodeError::InvalidFormat)
            }

            fn supports_region_decode(&self) -> bool {
                false
            }
        }

        let source = CountingSource {
            decodes: Cell::new(0),
        };
        let mut options = CropOptions::default();
        options.max_decoded_pixels = 1_000_000;

        assert!(matches!(
            Cropper::new(&source, 0, options),
            Err(CropError::OutOfMemory {
                width: 4000,
                height: 3000
            })
        ));
        assert_eq!(source.decodes.get(), 0);
    }

    #[test]
    fn test_cropper_works_through_trait_object() {
        let source = png_source(8, 8);
        let dyn_source: &dyn ImageSource = &source;
        let cropper = Cropper::new(dyn_source, 0, CropOptions::default()).unwrap();
        let result = cropper.crop(Rect::from_size(8, 8), 8, 8).unwrap();
        assert_eq!((result.width, result.height), (8, 8));
    }

    #[test]
    fn test_allocate_image_is_black() {
        let img = allocate_image(3, 2, &CropOptions::default()).unwrap();
        assert_eq!(img.pixels, vec![0u8; 18]);
    }

    #[test]
    fn test_allocate_image_over_limit() {
        let mut options = CropOptions::default();
        options.max_decoded_pixels = 5;
        assert!(matches!(
            allocate_image(3, 2, &options),
            Err(CropError::OutOfMemory { width: 3, height: 2 })
        ));
    }

    #[test]
    fn test_transform_image_rotation_swaps_size() {
        let src = DecodedImage::new(3, 2, (0..18).collect());
        let out = transform_image(&src, &Matrix::rotate(90.0), &CropOptions::default()).unwrap();
        assert_eq!((out.width, out.height), (2, 3));
        // Top-left moves to top-right
        assert_eq!(out.pixel(1, 0), src.pixel(0, 0));
    }
}
