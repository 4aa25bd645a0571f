//! Crop geometry: rectangles, affine matrices, rotation mapping, sample sizes,
//! and rendering through a transform.
//!
//! # Coordinate Spaces
//!
//! - **Raw space**: pixel coordinates of the image exactly as stored
//! - **Display space**: coordinates after the EXIF rotation is applied, which
//!   is where the user selects the crop rectangle
//!
//! # Conventions
//!
//! - Origin is the top-left corner, y grows downward
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Rectangles are half-open: `right` and `bottom` are exclusive

mod geometry;
mod matrix;
mod render;
mod rotation;
mod sample_size;

pub use geometry::{normalize_rotation, swaps_dimensions, Rect, RectF};
pub use matrix::{Matrix, ScaleToFit};
pub use render::{draw_transformed, InterpolationFilter};
pub use rotation::{map_rect_to_raw_space, RotatedImage};
pub use sample_size::{calculate_sample_size, calculate_source_sample_size};
