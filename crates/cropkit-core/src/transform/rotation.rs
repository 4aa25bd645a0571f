//! EXIF rotation handling: mapping display-space rectangles back to raw
//! space, and images that carry a pending rotation.
//!
//! # Algorithm
//!
//! A display-space rectangle is turned back by the negative EXIF rotation
//! about the origin. Rotating about the origin pushes the rectangle into
//! negative coordinates, so the result is shifted right by the raw width when
//! its left edge is negative, and down by the raw height when its top edge is
//! negative. For a 90 degree rotation of a `W x H` raw image:
//!
//! ```text
//! display (l, t, r, b)  ->  raw (t, H - r, b, H - l)
//! ```

use super::{swaps_dimensions, Matrix, Rect, RectF};
use crate::decode::DecodedImage;

/// Map a rectangle from display (rotated) space to raw (as-stored) space.
///
/// # Arguments
///
/// * `rect` - Crop rectangle in display space
/// * `exif_rotation` - Clockwise display rotation in degrees (0, 90, 180, 270)
/// * `raw_width` - Width of the image as stored
/// * `raw_height` - Height of the image as stored
///
/// # Returns
///
/// The rectangle in raw space, edges truncated toward zero. A rotation of 0
/// returns `rect` unchanged.
///
/// # Example
///
/// ```
/// use cropkit_core::transform::{map_rect_to_raw_space, Rect};
///
/// // 100x50 raw image displayed rotated 90 degrees (50x100 on screen)
/// let raw = map_rect_to_raw_space(Rect::new(0, 0, 50, 100), 90, 100, 50);
/// assert_eq!(raw, Rect::new(0, 0, 100, 50));
/// ```
pub fn map_rect_to_raw_space(
    rect: Rect,
    exif_rotation: i32,
    raw_width: u32,
    raw_height: u32,
) -> Rect {
    if exif_rotation == 0 {
        return rect;
    }

    let mut adjusted = Matrix::rotate(-(exif_rotation as f64)).map_rect(RectF::from(rect));

    // Rotation about the origin lands in negative space; move it back
    let dx = if adjusted.left < 0.0 {
        raw_width as f64
    } else {
        0.0
    };
    let dy = if adjusted.top < 0.0 {
        raw_height as f64
    } else {
        0.0
    };
    adjusted.offset(dx, dy);

    adjusted.truncate()
}

/// A decoded raw image plus the rotation needed to display it.
#[derive(Debug, Clone)]
pub struct RotatedImage {
    image: DecodedImage,
    rotation: i32,
}

impl RotatedImage {
    pub fn new(image: DecodedImage, rotation: i32) -> Self {
        Self { image, rotation }
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    pub fn into_image(self) -> DecodedImage {
        self.image
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// True if the rotation swaps the stored width and height.
    pub fn is_orientation_changed(&self) -> bool {
        swaps_dimensions(self.rotation)
    }

    /// Width as displayed.
    pub fn width(&self) -> u32 {
        if self.is_orientation_changed() {
            self.image.height
        } else {
            self.image.width
        }
    }

    /// Height as displayed.
    pub fn height(&self) -> u32 {
        if self.is_orientation_changed() {
            self.image.width
        } else {
            self.image.height
        }
    }

    /// Transform from raw pixel space to display space.
    ///
    /// Rotates about the stored image's centre and re-centres the result in
    /// the displayed bounds, so the rotated image covers exactly
    /// `(0, 0) - (width(), height())` for odd sizes too.
    pub fn rotate_matrix(&self) -> Matrix {
        let mut matrix = Matrix::identity();
        if self.rotation != 0 {
            let cx = self.image.width as f64 / 2.0;
            let cy = self.image.height as f64 / 2.0;
            matrix.pre_translate(-cx, -cy);
            matrix.post_rotate(self.rotation as f64);
            matrix.post_translate(self.width() as f64 / 2.0, self.height() as f64 / 2.0);
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(width: u32, height: u32) -> DecodedImage {
        DecodedImage::new(width, height, vec![0u8; (width * height * 3) as usize])
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let rect = Rect::new(-5, 3, 1000, 7);
        assert_eq!(map_rect_to_raw_space(rect, 0, 10, 10), rect);
    }

    #[test]
    fn test_rotate_90() {
        // Raw 100x50, displayed 50x100
        let raw = map_rect_to_raw_space(Rect::new(10, 20, 30, 60), 90, 100, 50);
        // (t, H - r, b, H - l)
        assert_eq!(raw, Rect::new(20, 20, 60, 40));
    }

    #[test]
    fn test_rotate_180() {
        let raw = map_rect_to_raw_space(Rect::new(10, 20, 30, 40), 180, 100, 50);
        // (W - r, H - b, W - l, H - t)
        assert_eq!(raw, Rect::new(70, 10, 90, 30));
    }

    #[test]
    fn test_rotate_270() {
        // Raw 100x50, displayed 50x100
        let raw = map_rect_to_raw_space(Rect::new(10, 20, 30, 60), 270, 100, 50);
        // (W - b, l, W - t, r)
        assert_eq!(raw, Rect::new(40, 10, 80, 30));
    }

    #[test]
    fn test_full_display_rect_maps_to_full_raw() {
        assert_eq!(
            map_rect_to_raw_space(Rect::new(0, 0, 50, 100), 90, 100, 50),
            Rect::from_size(100, 50)
        );
        assert_eq!(
            map_rect_to_raw_space(Rect::new(0, 0, 100, 50), 180, 100, 50),
            Rect::from_size(100, 50)
        );
        assert_eq!(
            map_rect_to_raw_space(Rect::new(0, 0, 50, 100), 270, 100, 50),
            Rect::from_size(100, 50)
        );
    }

    #[test]
    fn test_rotated_image_dimensions() {
        let img = RotatedImage::new(blank(40, 20), 90);
        assert_eq!((img.width(), img.height()), (20, 40));

        let img = RotatedImage::new(blank(40, 20), 180);
        assert_eq!((img.width(), img.height()), (40, 20));
    }

    #[test]
    fn test_rotate_matrix_identity_without_rotation() {
        let img = RotatedImage::new(blank(40, 20), 0);
        assert!(img.rotate_matrix().is_identity());
    }

    #[test]
    fn test_rotate_matrix_maps_bounds_onto_display() {
        for rotation in [90, 180, 270] {
            let img = RotatedImage::new(blank(40, 20), rotation);
            let bounds = img
                .rotate_matrix()
                .map_rect(RectF::new(0.0, 0.0, 40.0, 20.0));
            assert_eq!(
                bounds,
                RectF::new(0.0, 0.0, img.width() as f64, img.height() as f64),
                "rotation {}",
                rotation
            );
        }
    }

    #[test]
    fn test_rotate_matrix_odd_dimensions_cover_display() {
        for rotation in [90, 180, 270] {
            let img = RotatedImage::new(blank(5, 3), rotation);
            let bounds = img
                .rotate_matrix()
                .map_rect(RectF::new(0.0, 0.0, 5.0, 3.0));
            assert_eq!(
                bounds,
                RectF::new(0.0, 0.0, img.width() as f64, img.height() as f64),
                "rotation {}",
                rotation
            );
        }
    }

    #[test]
    fn test_extreme_rotation_value_does_not_overflow() {
        let rect = Rect::new(0, 0, 10, 10);
        // Must not panic
        let _ = map_rect_to_raw_space(rect, i32::MIN, 10, 10);
    }

    #[test]
    fn test_rotate_matrix_90_moves_top_left_to_top_right() {
        let img = RotatedImage::new(blank(40, 20), 90);
        // Centre of raw pixel (0, 0) lands in display pixel (19, 0)
        assert_eq!(img.rotate_matrix().map_point(0.5, 0.5), (19.5, 0.5));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for a raw image size and a display-space rectangle inside it.
    fn rect_in_display_strategy(
        rotation: i32,
    ) -> impl Strategy<Value = (u32, u32, Rect)> {
        (1u32..=400, 1u32..=400).prop_flat_map(move |(w, h)| {
            let (dw, dh) = if swaps_dimensions(rotation) { (h, w) } else { (w, h) };
            (0..dw, 0..dh).prop_flat_map(move |(l, t)| {
                ((l + 1)..=dw, (t + 1)..=dh).prop_map(move |(r, b)| {
                    (w, h, Rect::new(l as i32, t as i32, r as i32, b as i32))
                })
            })
        })
    }

    fn rotation_strategy() -> impl Strategy<Value = i32> {
        prop_oneof![Just(90), Just(180), Just(270)]
    }

    proptest! {
        /// Property: Rotation 0 is the identity for any rectangle.
        #[test]
        fn prop_zero_rotation_identity(
            l in -1000i32..1000, t in -1000i32..1000,
            r in -1000i32..1000, b in -1000i32..1000,
            w in 1u32..5000, h in 1u32..5000,
        ) {
            let rect = Rect::new(l, t, r, b);
            prop_assert_eq!(map_rect_to_raw_space(rect, 0, w, h), rect);
        }

        /// Property: Mapping with r then 360 - r round-trips.
        ///
        /// The second mapping treats the display image as the raw one, so its
        /// dimensions are the displayed (possibly swapped) ones.
        #[test]
        fn prop_complementary_rotation_round_trip(
            (rotation, (w, h, rect)) in rotation_strategy()
                .prop_flat_map(|r| (Just(r), rect_in_display_strategy(r))),
        ) {
            let raw = map_rect_to_raw_space(rect, rotation, w, h);
            let (dw, dh) = if swaps_dimensions(rotation) { (h, w) } else { (w, h) };
            let back = map_rect_to_raw_space(raw, 360 - rotation, dw, dh);
            prop_assert_eq!(back, rect);
        }

        /// Property: A rectangle inside the display bounds maps inside the raw bounds.
        #[test]
        fn prop_mapped_rect_within_raw_bounds(
            (rotation, (w, h, rect)) in rotation_strategy()
                .prop_flat_map(|r| (Just(r), rect_in_display_strategy(r))),
        ) {
            let raw = map_rect_to_raw_space(rect, rotation, w, h);
            prop_assert!(raw.is_within(w, h), "{} not within {}x{}", raw, w, h);
        }

        /// Property: Quarter turns swap the rectangle's width and height.
        #[test]
        fn prop_mapped_rect_dimensions(
            (rotation, (w, h, rect)) in rotation_strategy()
                .prop_flat_map(|r| (Just(r), rect_in_display_strategy(r))),
        ) {
            let raw = map_rect_to_raw_space(rect, rotation, w, h);
            if swaps_dimensions(rotation) {
                prop_assert_eq!((raw.width(), raw.height()), (rect.height(), rect.width()));
            } else {
                prop_assert_eq!((raw.width(), raw.height()), (rect.width(), rect.height()));
            }
        }
    }
}
