//! Codec service used by the pipeline.

use std::path::Path;

use image::ImageFormat;

use crate::decode::{self, DecodeError, DecodedImage, PixelBuffer};
use crate::encode::{self, EncodeError, ExifEmbed};

/// Decoding and encoding of image files.
pub trait ImageCodec {
    /// Decode a still image (the first frame of animated formats) and note
    /// whether the file animates.
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError>;

    /// Encode `buffer` as `format` with `exif` embedded where the format
    /// allows it, and replace `path` with the result.
    fn encode(
        &self,
        buffer: &PixelBuffer,
        path: &Path,
        format: ImageFormat,
        quality: u8,
        exif: &[u8],
    ) -> Result<ExifEmbed, EncodeError>;
}

/// [`ImageCodec`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdCodec;

impl ImageCodec for StdCodec {
    fn decode(&self, path: &Path) -> Result<DecodedImage, DecodeError> {
        decode::decode_file(path)
    }

    fn encode(
        &self,
        buffer: &PixelBuffer,
        path: &Path,
        format: ImageFormat,
        quality: u8,
        exif: &[u8],
    ) -> Result<ExifEmbed, EncodeError> {
        encode::save_buffer(buffer, path, format, quality, exif)
    }
}
