//! Image sources and decoding for the crop pipeline.
//!
//! This module provides:
//! - The [`ImageSource`] / [`RegionDecoder`] capability traits the croppers
//!   are written against
//! - Built-in sources backed by the `image` crate ([`MemorySource`],
//!   [`FileSource`])
//! - EXIF orientation lookup
//!
//! # Resource Handling
//!
//! Readers and decoders are owned values. Whatever a call opens is dropped
//! when the call returns, on the error path as well as on success.

mod exif;
mod region;
mod source;
mod types;

pub use exif::{read_exif_orientation, read_exif_rotation};
pub use region::downsample;
pub use source::{FileSource, ImageSource, LazyRegionDecoder, MemorySource, RegionDecoder};
pub use types::{DecodeError, DecodedImage, Orientation};
