//! EXIF orientation lookup.

use std::io::Cursor;

use exif::{In, Reader, Tag};

use super::Orientation;

/// Extract the EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn read_exif_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Clockwise display rotation in degrees declared by the image's EXIF data.
///
/// This is the `exif_rotation` the croppers expect. Returns 0 when the image
/// carries no orientation tag.
pub fn read_exif_rotation(bytes: &[u8]) -> i32 {
    read_exif_orientation(bytes).rotation_degrees()
}
