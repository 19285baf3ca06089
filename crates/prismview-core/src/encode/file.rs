//! Encoding pixel buffers into image files.
//!
//! JPEG, PNG and WebP go through their `ImageEncoder`, which also embeds the
//! EXIF block of the source; JPEG honours the quality setting. Every other
//! format goes through `DynamicImage::write_to` and carries no metadata.
//! Files are written next to their destination first and renamed into
//! place, so a failed save never leaves a partially written file behind.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat};
use thiserror::Error;

use crate::decode::PixelBuffer;

/// Errors that can occur while encoding or writing an image.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The destination has no extension we can map to an encoder
    #[error("Cannot determine an output format for {0}")]
    UnknownFormat(PathBuf),

    /// The encoder rejected the image
    #[error("{format:?} encoding failed: {message}")]
    EncodingFailed { format: ImageFormat, message: String },

    /// Writing or renaming the output file failed
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What became of the EXIF block handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExifEmbed {
    /// No block was given
    Nothing,
    Embedded,
    /// The format's encoder cannot carry EXIF
    Unsupported,
}

/// Encoded file contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub exif: ExifEmbed,
}

/// Encode a buffer into the bytes of an image file.
///
/// `quality` (1-100, clamped) only affects JPEG. Alpha is dropped for JPEG.
pub fn encode_to_vec(
    buffer: &PixelBuffer,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    encode_with_exif(buffer, format, quality, &[]).map(|encoded| encoded.bytes)
}

/// Encode a buffer and embed `exif` (a raw TIFF structure) when the format
/// can hold it.
///
/// # Errors
///
/// Returns an error when the buffer is malformed or the encoder fails. A
/// format without EXIF support is not an error; see [`Encoded::exif`].
pub fn encode_with_exif(
    buffer: &PixelBuffer,
    format: ImageFormat,
    quality: u8,
    exif: &[u8],
) -> Result<Encoded, EncodeError> {
    if buffer.width == 0 || buffer.height == 0 {
        return Err(EncodeError::InvalidDimensions {
            width: buffer.width,
            height: buffer.height,
        });
    }

    let expected = buffer.pixel_count() * buffer.format.channels();
    if buffer.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: buffer.pixels.len(),
        });
    }

    let img = buffer.to_dynamic().ok_or(EncodeError::InvalidPixelData {
        expected,
        actual: buffer.pixels.len(),
    })?;

    let failed = |e: image::ImageError| EncodeError::EncodingFailed {
        format,
        message: e.to_string(),
    };

    let mut out = Cursor::new(Vec::new());
    let embed = match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(img.into_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
            write_with(encoder, &rgb, exif)
        }
        ImageFormat::Png => write_with(PngEncoder::new(&mut out), &img, exif),
        ImageFormat::WebP => write_with(WebPEncoder::new_lossless(&mut out), &img, exif),
        _ => img.write_to(&mut out, format).map(|()| {
            if exif.is_empty() {
                ExifEmbed::Nothing
            } else {
                ExifEmbed::Unsupported
            }
        }),
    }
    .map_err(failed)?;

    Ok(Encoded {
        bytes: out.into_inner(),
        exif: embed,
    })
}

fn write_with<E: ImageEncoder>(
    mut encoder: E,
    img: &DynamicImage,
    exif: &[u8],
) -> image::ImageResult<ExifEmbed> {
    let embed = if exif.is_empty() {
        ExifEmbed::Nothing
    } else if encoder.set_exif_metadata(exif.to_vec()).is_ok() {
        ExifEmbed::Embedded
    } else {
        ExifEmbed::Unsupported
    };

    encoder.write_image(img.as_bytes(), img.width(), img.height(), img.color().into())?;
    Ok(embed)
}

/// Replace `path` with `bytes` via a temporary sibling file and a rename.
///
/// An existing file keeps its permissions. On any error the temporary file
/// is removed and `path` is left untouched.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), EncodeError> {
    let tmp = temp_sibling(path);
    let io_err = |source| EncodeError::Io {
        path: path.to_path_buf(),
        source,
    };

    let permissions = fs::metadata(path).ok().map(|meta| meta.permissions());
    let result = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            if let Some(permissions) = permissions {
                file.set_permissions(permissions)?;
            }
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(e));
    }
    Ok(())
}

/// Encode `buffer` with `exif` and write it to `path`.
pub fn save_buffer(
    buffer: &PixelBuffer,
    path: &Path,
    format: ImageFormat,
    quality: u8,
    exif: &[u8],
) -> Result<ExifEmbed, EncodeError> {
    let encoded = encode_with_exif(buffer, format, quality, exif)?;
    write_atomically(path, &encoded.bytes)?;
    tracing::info!(
        path = %path.display(),
        ?format,
        bytes = encoded.bytes.len(),
        exif = ?encoded.exif,
        "Saved image"
    );
    Ok(encoded.exif)
}

/// Pick an encoder from the destination's extension.
pub fn format_for_path(path: &Path) -> Result<ImageFormat, EncodeError> {
    ImageFormat::from_path(path).map_err(|_| EncodeError::UnknownFormat(path.to_path_buf()))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    path.with_file_name(format!(".{name}.prismview-tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_bytes, PixelFormat};

    fn gray(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(
            width,
            height,
            PixelFormat::Rgb8,
            vec![128; (width * height * 3) as usize],
        )
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let jpeg_bytes = encode_to_vec(&gray(100, 100), ImageFormat::Jpeg, 90).unwrap();

        // Check JPEG magic bytes (SOI marker)
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);

        // Check JPEG ends with EOI marker
        let len = jpeg_bytes.len();
        assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let rgba = PixelBuffer::new(2, 2, PixelFormat::Rgba8, vec![200; 16]);
        let bytes = encode_to_vec(&rgba, ImageFormat::Jpeg, 95).unwrap();
        let decoded = decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.buffer.format, PixelFormat::Rgb8);
    }

    #[test]
    fn test_encode_png_is_lossless() {
        let img = PixelBuffer::new(2, 1, PixelFormat::Rgba8, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let bytes = encode_to_vec(&img, ImageFormat::Png, 90).unwrap();
        assert_eq!(decode_bytes(&bytes).unwrap().buffer, img);
    }

    #[test]
    fn test_encode_quality_clamping() {
        assert!(encode_to_vec(&gray(10, 10), ImageFormat::Jpeg, 0).is_ok());
        assert!(encode_to_vec(&gray(10, 10), ImageFormat::Jpeg, 255).is_ok());
    }

    #[test]
    fn test_encode_invalid_pixel_data() {
        let img = PixelBuffer {
            width: 10,
            height: 10,
            format: PixelFormat::Rgb8,
            pixels: vec![0; 299],
        };
        let result = encode_to_vec(&img, ImageFormat::Png, 90);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_zero_dimensions() {
        let img = PixelBuffer::new(0, 10, PixelFormat::Rgb8, vec![]);
        let result = encode_to_vec(&img, ImageFormat::Jpeg, 90);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(
            format_for_path(Path::new("a/b/photo.JPG")).unwrap(),
            ImageFormat::Jpeg
        );
        assert!(matches!(
            format_for_path(Path::new("noextension")),
            Err(EncodeError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_save_buffer_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        save_buffer(&gray(4, 3), &path, ImageFormat::Png, 90, &[]).unwrap();

        let decoded = decode_bytes(&fs::read(&path).unwrap()).unwrap();
        assert_eq!((decoded.buffer.width, decoded.buffer.height), (4, 3));
        // No temporary file left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_write_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.png");
        fs::write(&path, b"original").unwrap();

        // Encoding fails before anything touches the disk
        let empty = PixelBuffer::new(0, 0, PixelFormat::Rgb8, vec![]);
        assert!(save_buffer(&empty, &path, ImageFormat::Png, 90, &[]).is_err());
        assert_eq!(fs::read(&path).unwrap(), b"original");
    }

    /// Minimal little-endian TIFF structure with an empty IFD0
    const TIFF_STUB: [u8; 14] = [
        0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn test_exif_embedded_in_jpeg_png_webp() {
        for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP] {
            let encoded = encode_with_exif(&gray(4, 4), format, 90, &TIFF_STUB).unwrap();
            assert_eq!(encoded.exif, ExifEmbed::Embedded, "{format:?}");

            let mut decoder = image::ImageReader::new(Cursor::new(&encoded.bytes))
                .with_guessed_format()
                .unwrap()
                .into_decoder()
                .unwrap();
            let exif = image::ImageDecoder::exif_metadata(&mut decoder).unwrap();
            assert_eq!(exif.as_deref(), Some(TIFF_STUB.as_slice()), "{format:?}");
        }
    }

    #[test]
    fn test_exif_unsupported_format() {
        let encoded = encode_with_exif(&gray(4, 4), ImageFormat::Bmp, 90, &TIFF_STUB).unwrap();
        assert_eq!(encoded.exif, ExifEmbed::Unsupported);

        let plain = encode_with_exif(&gray(4, 4), ImageFormat::Bmp, 90, &[]).unwrap();
        assert_eq!(plain.exif, ExifEmbed::Nothing);
        assert_eq!(plain.bytes, encoded.bytes);
    }

    #[test]
    fn test_no_exif_requested() {
        let encoded = encode_with_exif(&gray(4, 4), ImageFormat::Png, 90, &[]).unwrap();
        assert_eq!(encoded.exif, ExifEmbed::Nothing);
        assert_eq!(encoded.bytes, encode_to_vec(&gray(4, 4), ImageFormat::Png, 90).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.png");
        fs::write(&path, b"original").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomically(&path, b"replaced").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"replaced");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_write_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let result = write_atomically(&path, b"data");
        assert!(matches!(result, Err(EncodeError::Io { .. })));
        assert!(!path.exists());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
