//! Still-image decoding and animation probing via the `image` crate.

use std::io::Cursor;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, ImageDecoder, ImageFormat, ImageReader};

use super::{AnimationInfo, DecodeError, DecodedImage, PixelBuffer};

/// Decode an image from bytes, guessing the container format from its signature.
///
/// The EXIF orientation is *not* applied here; the pipeline does that as a
/// separate, configurable step.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the signature is not recognized,
/// `DecodeError::CorruptedFile` if decoding fails and
/// `DecodeError::InvalidSize` for images with a zero dimension.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::InvalidSize {
            width: img.width(),
            height: img.height(),
        });
    }

    Ok(DecodedImage {
        buffer: PixelBuffer::from_dynamic(img),
        format,
        animated: probe_animation(bytes).is_some_and(|info| info.is_animated()),
    })
}

/// Read and decode an image file.
pub fn decode_file(path: &Path) -> Result<DecodedImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_bytes(&bytes)
}

/// Probe a GIF, WebP or APNG stream for a second frame.
///
/// Frames are decoded only up to [`ANIMATION_PROBE_FRAMES`], so `frames` is 1
/// for a still image and 2 for anything that animates. Returns `None` for
/// formats that cannot animate or when the header cannot be parsed.
pub fn probe_animation(bytes: &[u8]) -> Option<AnimationInfo> {
    let format = image::guess_format(bytes).ok()?;
    let cursor = Cursor::new(bytes);

    match format {
        ImageFormat::Gif => {
            let decoder = GifDecoder::new(cursor).ok()?;
            let (width, height) = decoder.dimensions();
            let frames = count_frames(decoder.into_frames());
            Some(AnimationInfo {
                frames,
                width,
                height,
            })
        }
        ImageFormat::WebP => {
            let decoder = WebPDecoder::new(cursor).ok()?;
            let (width, height) = decoder.dimensions();
            let frames = if decoder.has_animation() {
                count_frames(decoder.into_frames())
            } else {
                1
            };
            Some(AnimationInfo {
                frames,
                width,
                height,
            })
        }
        ImageFormat::Png => {
            let decoder = PngDecoder::new(cursor).ok()?;
            let (width, height) = decoder.dimensions();
            let frames = if decoder.is_apng().ok()? {
                count_frames(decoder.apng().ok()?.into_frames())
            } else {
                1
            };
            Some(AnimationInfo {
                frames,
                width,
                height,
            })
        }
        _ => None,
    }
}

/// Frames decoded before a stream counts as animated
pub const ANIMATION_PROBE_FRAMES: usize = 2;

fn count_frames(frames: image::Frames<'_>) -> usize {
    frames
        .take(ANIMATION_PROBE_FRAMES)
        .take_while(Result::is_ok)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::PixelFormat;
    use image::{DynamicImage, RgbImage, RgbaImage};

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png_rgb() {
        let rgb = RgbImage::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let bytes = encode_png(DynamicImage::ImageRgb8(rgb));

        let decoded = decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(decoded.format_name(), "png");
        assert_eq!(decoded.buffer.format, PixelFormat::Rgb8);
        assert_eq!(decoded.buffer.pixels, vec![255, 0, 0, 0, 255, 0]);
        assert!(!decoded.animated);
    }

    #[test]
    fn test_decode_png_keeps_alpha() {
        let rgba = RgbaImage::from_raw(1, 1, vec![1, 2, 3, 4]).unwrap();
        let bytes = encode_png(DynamicImage::ImageRgba8(rgba));

        let decoded = decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.buffer.format, PixelFormat::Rgba8);
        assert_eq!(decoded.buffer.pixels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result = decode_bytes(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(decode_bytes(&[]).is_err());
    }

    #[test]
    fn test_decode_truncated_png() {
        let rgb = RgbImage::from_raw(8, 8, vec![7; 8 * 8 * 3]).unwrap();
        let bytes = encode_png(DynamicImage::ImageRgb8(rgb));
        let result = decode_bytes(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_file(Path::new("/definitely/not/here.png"));
        assert!(matches!(result, Err(DecodeError::Io { .. })));
    }

    #[test]
    fn test_probe_still_png_is_single_frame() {
        let rgb = RgbImage::from_raw(3, 2, vec![0; 3 * 2 * 3]).unwrap();
        let bytes = encode_png(DynamicImage::ImageRgb8(rgb));

        let info = probe_animation(&bytes).unwrap();
        assert_eq!(info.frames, 1);
        assert_eq!((info.width, info.height), (3, 2));
        assert!(!info.is_animated());
    }

    #[test]
    fn test_probe_gif_stops_after_second_frame() {
        use image::codecs::gif::GifEncoder;
        use image::{Delay, Frame};

        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            let frames = (0..3u8).map(|i| {
                let buf = RgbaImage::from_pixel(4, 4, image::Rgba([i * 80, 0, 0, 255]));
                Frame::from_parts(buf, 0, 0, Delay::from_numer_denom_ms(100, 1))
            });
            encoder.encode_frames(frames).unwrap();
        }

        let info = probe_animation(&bytes).unwrap();
        assert_eq!(info.frames, ANIMATION_PROBE_FRAMES);
        assert!(info.is_animated());

        let decoded = decode_bytes(&bytes).unwrap();
        assert!(decoded.animated);
        assert_eq!((decoded.buffer.width, decoded.buffer.height), (4, 4));
    }

    #[test]
    fn test_probe_jpeg_is_not_animatable() {
        let rgb = RgbImage::from_raw(2, 2, vec![128; 12]).unwrap();
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();
        assert!(probe_animation(out.get_ref()).is_none());
    }
}
