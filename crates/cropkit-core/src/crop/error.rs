//! Error type for crop operations.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::transform::Rect;

/// Errors produced while cropping.
#[derive(Debug, Error)]
pub enum CropError {
    /// The raw-space crop rectangle could not be decoded from the image,
    /// usually because it lies outside the image bounds.
    #[error("Rectangle {rect} is outside of the image ({image_width},{image_height},{rotation})")]
    InvalidRegion {
        /// The attempted rectangle, in raw space.
        rect: Rect,
        image_width: u32,
        image_height: u32,
        /// EXIF rotation the rectangle was mapped with.
        rotation: i32,
        #[source]
        source: DecodeError,
    },

    /// A pixel buffer could not be allocated.
    #[error("Out of memory allocating a {width}x{height} image")]
    OutOfMemory { width: u32, height: u32 },

    /// The source could not be opened or decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The crop options are unusable.
    #[error("Invalid crop options: {0}")]
    InvalidOptions(&'static str),
}
