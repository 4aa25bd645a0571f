//! Cropkit Core - EXIF-aware image cropping
//!
//! This crate crops a user-selected rectangle out of a (possibly EXIF-rotated)
//! source image and produces a correctly oriented, correctly sized bitmap.
//!
//! # Pipeline
//!
//! 1. The crop rectangle, selected in display space, is mapped back to raw
//!    (as-stored) space with [`map_rect_to_raw_space`].
//! 2. A power-of-two decode sample size is picked with
//!    [`calculate_sample_size`].
//! 3. One of two strategies produces the final bitmap:
//!    - **Region**: decode only the needed sub-region at the sample size,
//!      then re-apply scale and rotation ([`crop_region`]).
//!    - **In-memory**: draw a fully decoded image through a transform
//!      ([`crop_in_memory`]). Used when the source cannot decode regions.
//!
//! [`Cropper`] resolves the strategy once from the source's capabilities.

pub mod crop;
pub mod decode;
pub mod options;
pub mod transform;

pub use crop::{crop_in_memory, crop_region, CropError, CropStrategy, Cropper};
pub use decode::{
    read_exif_rotation, DecodeError, DecodedImage, FileSource, ImageSource, MemorySource,
    Orientation, RegionDecoder,
};
pub use options::CropOptions;
pub use transform::{
    calculate_sample_size, calculate_source_sample_size, map_rect_to_raw_space, InterpolationFilter,
    Matrix, Rect, RotatedImage,
};
