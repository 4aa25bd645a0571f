//! Crop WASM bindings.
//!
//! Rectangles cross the boundary as four integer edges in display space.
//! Options are a plain object with any of `oversampleFactor`, `filter`
//! (`"nearest"`, `"bilinear"`, `"lanczos3"`) and `maxDecodedPixels`; pass
//! `undefined` for the defaults.
//!
//! # Example
//!
//! ```typescript
//! import { crop_image, read_exif_rotation } from '@cropkit/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const rotation = read_exif_rotation(bytes);
//! const cropped = crop_image(bytes, rotation, 100, 50, 900, 650, 400, 300, undefined);
//! console.log(`Cropped ${cropped.width}x${cropped.height}`);
//! ```

use crate::types::JsDecodedImage;
use cropkit_core::{
    CropError, CropOptions, Cropper, DecodedImage, MemorySource, Rect, RotatedImage,
};
use wasm_bindgen::prelude::*;

fn to_js_error(err: CropError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn parse_options(options: JsValue) -> Result<CropOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(CropOptions::default());
    }
    let options: CropOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from(js_sys::Error::new(&format!("Invalid crop options: {}", e))))?;
    options.validate().map_err(to_js_error)?;
    Ok(options)
}

fn crop_image_inner(
    bytes: &[u8],
    exif_rotation: i32,
    rect: Rect,
    out_width: u32,
    out_height: u32,
    options: CropOptions,
) -> Result<DecodedImage, CropError> {
    let source = MemorySource::new(bytes);
    Cropper::new(&source, exif_rotation, options)?.crop(rect, out_width, out_height)
}

fn crop_region_inner(
    bytes: &[u8],
    exif_rotation: i32,
    rect: Rect,
    out_width: u32,
    out_height: u32,
    options: &CropOptions,
) -> Result<DecodedImage, CropError> {
    let source = MemorySource::new(bytes);
    cropkit_core::crop_region(&source, exif_rotation, rect, out_width, out_height, options)
}

fn crop_in_memory_inner(
    image: &JsDecodedImage,
    exif_rotation: i32,
    rect: Rect,
    out_width: u32,
    out_height: u32,
    options: &CropOptions,
) -> Result<DecodedImage, CropError> {
    options.validate()?;
    let rotated = RotatedImage::new(image.to_decoded()?, exif_rotation);
    cropkit_core::crop_in_memory(&rotated, rect, out_width, out_height, options)
}

/// Crop an encoded image, letting the library pick the crop strategy.
///
/// # Arguments
///
/// * `bytes` - Encoded JPEG or PNG file bytes
/// * `exif_rotation` - Clockwise degrees the stored pixels must be turned to display (see `read_exif_rotation`)
/// * `left`, `top`, `right`, `bottom` - Crop rectangle in display space
/// * `out_width`, `out_height` - Requested output size in display orientation
/// * `options` - Crop options object, or `undefined`
///
/// # Errors
///
/// Returns an `Error` if the bytes cannot be decoded, the rectangle lies
/// outside the image, or the crop would exceed the pixel limit.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn crop_image(
    bytes: &[u8],
    exif_rotation: i32,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    out_width: u32,
    out_height: u32,
    options: JsValue,
) -> Result<JsDecodedImage, JsValue> {
    let options = parse_options(options)?;
    crop_image_inner(
        bytes,
        exif_rotation,
        Rect::new(left, top, right, bottom),
        out_width,
        out_height,
        options,
    )
    .map(JsDecodedImage::from_decoded)
    .map_err(to_js_error)
}

/// Crop an encoded image by decoding only the selected region.
///
/// Same arguments as `crop_image`. The result is scaled down to the output
/// size when the decode is larger, and turned into display orientation.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn crop_region(
    bytes: &[u8],
    exif_rotation: i32,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    out_width: u32,
    out_height: u32,
    options: JsValue,
) -> Result<JsDecodedImage, JsValue> {
    let options = parse_options(options)?;
    crop_region_inner(
        bytes,
        exif_rotation,
        Rect::new(left, top, right, bottom),
        out_width,
        out_height,
        &options,
    )
    .map(JsDecodedImage::from_decoded)
    .map_err(to_js_error)
}

/// Crop an already decoded raw image that still needs `exif_rotation`
/// applied.
///
/// The output is exactly `out_width x out_height`. Parts of it the rectangle
/// does not cover stay black.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn crop_in_memory(
    image: &JsDecodedImage,
    exif_rotation: i32,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    out_width: u32,
    out_height: u32,
    options: JsValue,
) -> Result<JsDecodedImage, JsValue> {
    let options = parse_options(options)?;
    crop_in_memory_inner(
        image,
        exif_rotation,
        Rect::new(left, top, right, bottom),
        out_width,
        out_height,
        &options,
    )
    .map(JsDecodedImage::from_decoded)
    .map_err(to_js_error)
}

/// Map a display-space rectangle to raw space.
///
/// Returns `[left, top, right, bottom]`.
#[wasm_bindgen]
pub fn map_rect_to_raw_space(
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    exif_rotation: i32,
    raw_width: u32,
    raw_height: u32,
) -> Vec<i32> {
    let raw = cropkit_core::map_rect_to_raw_space(
        Rect::new(left, top, right, bottom),
        exif_rotation,
        raw_width,
        raw_height,
    );
    vec![raw.left, raw.top, raw.right, raw.bottom]
}

/// Power-of-two decode sample size for fitting `width x height` into
/// `max_width x max_height`.
#[wasm_bindgen]
pub fn calculate_sample_size(width: u32, height: u32, max_width: u32, max_height: u32) -> u32 {
    cropkit_core::calculate_sample_size(width, height, max_width, max_height)
}

/// Display rotation in degrees from the EXIF Orientation tag, 0 if absent.
#[wasm_bindgen]
pub fn read_exif_rotation(bytes: &[u8]) -> i32 {
    cropkit_core::read_exif_rotation(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([x as u8, y as u8, 3])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn raw_image(width: u32, height: u32) -> JsDecodedImage {
        let pixels = (0..height)
            .flat_map(|y| (0..width).flat_map(move |x| [x as u8, y as u8, 3]))
            .collect();
        JsDecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_map_rect_no_rotation() {
        assert_eq!(map_rect_to_raw_space(1, 2, 3, 4, 0, 10, 10), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_map_rect_quarter_turn() {
        // 100x50 raw, displayed 50x100
        assert_eq!(
            map_rect_to_raw_space(0, 0, 50, 100, 90, 100, 50),
            vec![0, 0, 100, 50]
        );
    }

    #[test]
    fn test_calculate_sample_size() {
        assert_eq!(calculate_sample_size(1000, 500, 300, 300), 4);
        assert_eq!(calculate_sample_size(100, 100, 200, 200), 1);
    }

    #[test]
    fn test_read_exif_rotation_without_exif() {
        assert_eq!(read_exif_rotation(&png_bytes(2, 2)), 0);
        assert_eq!(read_exif_rotation(&[]), 0);
    }

    #[test]
    fn test_crop_image_inner() {
        let result = crop_image_inner(
            &png_bytes(40, 20),
            0,
            Rect::new(10, 5, 20, 15),
            10,
            10,
            CropOptions::default(),
        )
        .unwrap();
        assert_eq!((result.width, result.height), (10, 10));
        assert_eq!(result.pixel(0, 0), [10, 5, 3]);
    }

    #[test]
    fn test_crop_region_inner_rotated() {
        let result = crop_region_inner(
            &png_bytes(40, 20),
            90,
            Rect::new(0, 0, 20, 40),
            20,
            40,
            &CropOptions::default(),
        )
        .unwrap();
        assert_eq!((result.width, result.height), (20, 40));
        assert_eq!(result.pixel(0, 0), [0, 19, 3]);
    }

    #[test]
    fn test_crop_region_inner_out_of_bounds() {
        let result = crop_region_inner(
            &png_bytes(40, 20),
            0,
            Rect::new(0, 0, 41, 20),
            41,
            20,
            &CropOptions::default(),
        );
        assert!(matches!(result, Err(CropError::InvalidRegion { .. })));
    }

    #[test]
    fn test_crop_in_memory_inner() {
        let result = crop_in_memory_inner(
            &raw_image(20, 10),
            180,
            Rect::new(0, 0, 4, 2),
            4,
            2,
            &CropOptions::default(),
        )
        .unwrap();
        assert_eq!(result.pixel(0, 0), [19, 9, 3]);
    }

    #[test]
    fn test_crop_in_memory_inner_rejects_short_pixel_buffer() {
        let image = JsDecodedImage::new(8, 8, vec![0u8; 3]);
        let result = crop_in_memory_inner(
            &image,
            0,
            Rect::new(0, 0, 8, 8),
            8,
            8,
            &CropOptions::default(),
        );
        assert!(matches!(result, Err(CropError::Decode(_))));
    }

    #[test]
    fn test_crop_in_memory_inner_rejects_bad_options() {
        let mut options = CropOptions::default();
        options.oversample_factor = 0;
        let result =
            crop_in_memory_inner(&raw_image(4, 4), 0, Rect::new(0, 0, 4, 4), 4, 4, &options);
        assert!(matches!(result, Err(CropError::InvalidOptions(_))));
    }
}
