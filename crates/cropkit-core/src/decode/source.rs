//! Image source capabilities and their `image`-crate implementations.
//!
//! The croppers never touch files or byte buffers directly. They talk to an
//! [`ImageSource`], which can read bounds, decode the whole image, and open a
//! [`RegionDecoder`] for sub-region decodes at a downsample factor.

use std::io::{BufRead, Cursor, Seek};
use std::path::{Path, PathBuf};

use image::ImageReader;
use log::{debug, warn};

use super::{downsample, DecodeError, DecodedImage};
use crate::transform::Rect;

/// Decodes sub-regions of one opened image.
///
/// Dropping the decoder releases whatever it holds open.
pub trait RegionDecoder {
    /// Raw (as-stored) dimensions of the image.
    fn dimensions(&self) -> (u32, u32);

    /// Decode `rect` (raw space) at 1/`sample_size` resolution.
    ///
    /// Returns `Ok(None)` when the decoder produced no pixels, and
    /// [`DecodeError::RegionOutOfBounds`] when `rect` is not contained in the
    /// image.
    fn decode_region(
        &mut self,
        rect: Rect,
        sample_size: u32,
    ) -> Result<Option<DecodedImage>, DecodeError>;
}

/// A decodable image supplied by the host.
pub trait ImageSource {
    /// Read the raw dimensions without decoding pixel data.
    fn read_dimensions(&self) -> Result<(u32, u32), DecodeError>;

    /// Decode the whole image to RGB8, without applying EXIF orientation.
    fn decode_full(&self) -> Result<DecodedImage, DecodeError>;

    /// Whether [`ImageSource::open_region_decoder`] is usable.
    fn supports_region_decode(&self) -> bool {
        true
    }

    /// Open a decoder for sub-region extraction.
    ///
    /// Decoders that buffer the whole image must refuse images above
    /// `max_pixels` with [`DecodeError::OutOfMemory`].
    fn open_region_decoder(
        &self,
        max_pixels: u64,
    ) -> Result<Box<dyn RegionDecoder + '_>, DecodeError> {
        Ok(Box::new(LazyRegionDecoder::open(self, max_pixels)?))
    }
}

/// Region decoder that reads bounds on open and decodes pixels on first use.
///
/// Sources without a native region decoder get this one by default: the full
/// image is decoded once, then each region is cropped out and downsampled.
pub struct LazyRegionDecoder<'a, S: ImageSource + ?Sized> {
    source: &'a S,
    width: u32,
    height: u32,
    max_pixels: u64,
    decoded: Option<image::RgbImage>,
}

impl<'a, S: ImageSource + ?Sized> LazyRegionDecoder<'a, S> {
    /// Read the source's bounds. Pixel data is not decoded yet, and will
    /// only be if the image has at most `max_pixels` pixels.
    pub fn open(source: &'a S, max_pixels: u64) -> Result<Self, DecodeError> {
        let (width, height) = source.read_dimensions()?;
        Ok(Self {
            source,
            width,
            height,
            max_pixels,
            decoded: None,
        })
    }

    fn pixels(&mut self) -> Result<&image::RgbImage, DecodeError> {
        if self.decoded.is_none() {
            let pixels = self.width as u64 * self.height as u64;
            if pixels > self.max_pixels {
                warn!(
                    "refusing full decode of {}x{}, limit is {} pixels",
                    self.width, self.height, self.max_pixels
                );
                return Err(DecodeError::OutOfMemory);
            }

            let full = self.source.decode_full()?;
            if (full.width, full.height) != (self.width, self.height) {
                return Err(DecodeError::CorruptedFile(format!(
                    "decoded size {}x{} does not match header size {}x{}",
                    full.width, full.height, self.width, self.height
                )));
            }
            let rgb = full
                .to_rgb_image()
                .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbImage".into()))?;
            self.decoded = Some(rgb);
        }
        self.decoded
            .as_ref()
            .ok_or_else(|| DecodeError::CorruptedFile("Image was not decoded".into()))
    }
}

impl<S: ImageSource + ?Sized> RegionDecoder for LazyRegionDecoder<'_, S> {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn decode_region(
        &mut self,
        rect: Rect,
        sample_size: u32,
    ) -> Result<Option<DecodedImage>, DecodeError> {
        if !rect.is_within(self.width, self.height) {
            return Err(DecodeError::RegionOutOfBounds);
        }
        if rect.is_empty() {
            return Ok(None);
        }

        let pixels = self.pixels()?;
        let region = image::imageops::crop_imm(
            pixels,
            rect.left as u32,
            rect.top as u32,
            rect.width() as u32,
            rect.height() as u32,
        );
        let result = downsample(&*region, sample_size);
        debug!(
            "decoded region {} at 1/{} -> {}x{}",
            rect, sample_size, result.width, result.height
        );
        Ok(Some(result))
    }
}

fn dimensions_of<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<(u32, u32), DecodeError> {
    Ok(reader.with_guessed_format()?.into_dimensions()?)
}

fn decode<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<DecodedImage, DecodeError> {
    let img = reader.with_guessed_format()?.decode()?;
    Ok(DecodedImage::from_rgb_image(img.into_rgb8()))
}

/// An encoded image held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn reader(&self) -> ImageReader<Cursor<&[u8]>> {
        ImageReader::new(Cursor::new(self.bytes.as_slice()))
    }
}

impl ImageSource for MemorySource {
    fn read_dimensions(&self) -> Result<(u32, u32), DecodeError> {
        dimensions_of(self.reader())
    }

    fn decode_full(&self) -> Result<DecodedImage, DecodeError> {
        debug!("decoding {} byte image", self.bytes.len());
        decode(self.reader())
    }
}

/// An encoded image on disk. The file is opened per call and closed on return.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for FileSource {
    fn read_dimensions(&self) -> Result<(u32, u32), DecodeError> {
        dimensions_of(ImageReader::open(&self.path)?)
    }

    fn decode_full(&self) -> Result<DecodedImage, DecodeError> {
        debug!("decoding {}", self.path.display());
        decode(ImageReader::open(&self.path)?)
    }
}
